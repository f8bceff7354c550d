//! Error responses.
//!
//! Every failure is rendered as `{"error", "message"}`, plus `"errors"` with
//! per-field details for validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};
use validator::ValidationErrors;

use salesdesk_core::sales::SaleError;
use salesdesk_shared::{AppError, ValidationResult};

/// Builds the HTTP response for an application error.
pub fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let code = err.error_code().to_lowercase();

    if err.is_server_error() {
        error!(error = %err, "Request failed");
        return (
            status,
            Json(json!({
                "error": code,
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    warn!(error = %err, status = status.as_u16(), "Request rejected");

    let message = match err {
        AppError::NotFound(m)
        | AppError::BusinessRule(m)
        | AppError::Conflict(m)
        | AppError::Database(m)
        | AppError::Internal(m)
        | AppError::Validation { message: m, .. } => m.clone(),
    };

    match err {
        AppError::Validation { errors, .. } => (
            status,
            Json(json!({
                "error": code,
                "message": message,
                "errors": errors
            })),
        )
            .into_response(),
        _ => (
            status,
            Json(json!({
                "error": code,
                "message": message
            })),
        )
            .into_response(),
    }
}

/// Maps a sales error to its HTTP response.
pub fn map_sale_error(err: SaleError) -> Response {
    error_response(&AppError::from(err))
}

/// Maps request body validation failures to a 400 response.
pub fn map_validation_errors(errors: ValidationErrors) -> Response {
    let result = ValidationResult::from(errors);
    error_response(&AppError::Validation {
        message: "Request validation failed".to_string(),
        errors: result.errors,
    })
}
