//! Sales error types.
//!
//! Every mutation on the aggregate fails fast with one of these variants and
//! leaves the sale untouched.

use thiserror::Error;

use salesdesk_shared::types::{ProductId, SaleId};
use salesdesk_shared::{AppError, ValidationErrorDetail};

use crate::sales::types::SaleStatus;

/// Errors that can occur while working with sales.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    /// The sale is not in a status that allows the attempted action.
    #[error("Cannot {action} a {status} sale")]
    InvalidStatus {
        /// What was attempted (e.g. "add an item to").
        action: &'static str,
        /// The current sale status.
        status: SaleStatus,
    },

    /// Attempted to complete a cancelled sale.
    #[error("Cannot set a cancelled sale as completed")]
    CompleteCancelled,

    /// An active item for the product already exists on the sale.
    #[error("Product {product_name} is already present")]
    DuplicateItem {
        /// Name of the duplicated product.
        product_name: String,
    },

    /// More units of one product than a sale allows.
    #[error("Cannot add more than {max} units of a single product to a sale")]
    QuantityLimitExceeded {
        /// The per-product cap.
        max: u32,
    },

    /// Attempted to change a cancelled line item.
    #[error("Cannot update the quantity of a cancelled sale item")]
    ItemCancelled,

    /// Quantity of zero was requested.
    #[error("Quantity must be greater than zero")]
    ZeroQuantity,

    /// The discount policy has no tier for the quantity.
    #[error("There is no discount tier that matches the quantity ({0}) provided")]
    NoDiscountTier(u32),

    /// No item (of any status) for the product exists on the sale.
    #[error("Item for product {0} does not exist on this sale")]
    ItemNotInSale(ProductId),

    /// No active item for the product exists on the sale.
    #[error("Sale item for product {0} not found")]
    ItemNotFound(ProductId),

    /// Sale not found.
    #[error("Sale {0} not found")]
    SaleNotFound(SaleId),

    /// Command input failed validation.
    #[error("Invalid input: {} rule(s) failed", .0.len())]
    InvalidInput(Vec<ValidationErrorDetail>),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Broad classification of a [`SaleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleErrorKind {
    /// A business rule was violated.
    Domain,
    /// The product is already on the sale.
    Duplicate,
    /// The sale or item does not exist.
    NotFound,
    /// Input failed validation.
    Validation,
    /// The store failed.
    Storage,
}

impl SaleError {
    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> SaleErrorKind {
        match self {
            Self::DuplicateItem { .. } => SaleErrorKind::Duplicate,
            Self::ItemNotFound(_) | Self::SaleNotFound(_) => SaleErrorKind::NotFound,
            Self::InvalidInput(_) => SaleErrorKind::Validation,
            Self::Storage(_) => SaleErrorKind::Storage,
            Self::InvalidStatus { .. }
            | Self::CompleteCancelled
            | Self::QuantityLimitExceeded { .. }
            | Self::ItemCancelled
            | Self::ZeroQuantity
            | Self::NoDiscountTier(_)
            | Self::ItemNotInSale(_) => SaleErrorKind::Domain,
        }
    }
}

impl From<SaleError> for AppError {
    fn from(err: SaleError) -> Self {
        match err.kind() {
            SaleErrorKind::NotFound => Self::NotFound(err.to_string()),
            SaleErrorKind::Duplicate => Self::Conflict(err.to_string()),
            SaleErrorKind::Domain => Self::BusinessRule(err.to_string()),
            SaleErrorKind::Storage => Self::Database(err.to_string()),
            SaleErrorKind::Validation => {
                let message = err.to_string();
                let errors = match err {
                    SaleError::InvalidInput(errors) => errors,
                    _ => Vec::new(),
                };
                Self::Validation { message, errors }
            }
        }
    }
}
