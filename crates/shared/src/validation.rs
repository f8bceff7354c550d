//! Validation result types.
//!
//! Entity validation never fails fast: every broken rule is collected as a
//! `(field, code, message)` detail so callers can render all of them at once.

use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field the rule applies to (e.g. `sale_number`, `items[0].quantity`).
    pub field: String,
    /// Machine-readable rule code (e.g. `max_length`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ValidationErrorDetail {
    /// Creates a new validation error detail.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Outcome of validating an entity or a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether every rule passed.
    pub is_valid: bool,
    /// Failed rules, in evaluation order.
    pub errors: Vec<ValidationErrorDetail>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

impl ValidationResult {
    /// A result with no failures.
    #[must_use]
    pub const fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Builds a result from a list of failures.
    #[must_use]
    pub fn from_errors(errors: Vec<ValidationErrorDetail>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Records a failed rule.
    pub fn push(
        &mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors
            .push(ValidationErrorDetail::new(field, code, message));
        self.is_valid = false;
    }

    /// Appends the failures of another result, prefixing their field names.
    pub fn merge_prefixed(&mut self, prefix: &str, other: Self) {
        for detail in other.errors {
            self.push(
                format!("{prefix}.{}", detail.field),
                detail.code,
                detail.message,
            );
        }
    }

    /// Returns true if a failure was recorded for `field`.
    #[must_use]
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl From<ValidationErrors> for ValidationResult {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map_or_else(|| format!("{field} is invalid"), ToString::to_string);
                    ValidationErrorDetail::new(field.clone(), e.code.to_string(), message)
                })
            })
            .collect();

        // HashMap iteration order is unspecified
        details.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
        Self::from_errors(details)
    }
}
