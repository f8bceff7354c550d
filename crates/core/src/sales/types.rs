//! Sales domain types.
//!
//! Status enums for sales and their line items, plus the plain records used
//! to move aggregates across the storage boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use salesdesk_shared::types::{BranchId, CustomerId, ProductId, SaleId, SaleItemId};

/// Lifecycle status of a sale.
///
/// Valid transitions:
/// - Pending → Completed (complete)
/// - Pending → Cancelled (cancel)
/// - Completed → Cancelled (cancel)
///
/// `Unknown` is never produced by the domain. It only shows up when a stored
/// value cannot be recognized, and fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Uninitialized or unrecognized status.
    Unknown,
    /// Sale is open and its items can be modified.
    Pending,
    /// Sale has been completed.
    Completed,
    /// Sale has been cancelled (terminal).
    Cancelled,
}

impl SaleStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unknown" => Some(Self::Unknown),
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if items on the sale can be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a sale line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleItemStatus {
    /// Uninitialized or unrecognized status.
    Unknown,
    /// Item is active and counts toward the sale total.
    Confirmed,
    /// Item has been cancelled (terminal).
    Cancelled,
}

impl SaleItemStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unknown" => Some(Self::Unknown),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for SaleItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted state of a sale, without its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Sale ID.
    pub id: SaleId,
    /// Human-facing sale number.
    pub sale_number: String,
    /// Date of the sale.
    pub sale_date: DateTime<Utc>,
    /// Customer ID.
    pub customer_id: CustomerId,
    /// Customer display name.
    pub customer_name: String,
    /// Branch ID.
    pub branch_id: BranchId,
    /// Branch display name.
    pub branch_name: String,
    /// Stored total (recomputed on restore).
    pub total_amount: Decimal,
    /// Sale status.
    pub status: SaleStatus,
    /// When the sale was created.
    pub created_at: DateTime<Utc>,
    /// When the sale was last modified.
    pub updated_at: Option<DateTime<Utc>>,
    /// When the sale was completed.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Persisted state of a sale line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItemRecord {
    /// Item ID.
    pub id: SaleItemId,
    /// Owning sale.
    pub sale_id: SaleId,
    /// Product ID.
    pub product_id: ProductId,
    /// Product display name.
    pub product_name: String,
    /// Units sold.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Discount rate in [0, 1].
    pub discount: Decimal,
    /// Item status.
    pub status: SaleItemStatus,
    /// When the item was added.
    pub created_at: DateTime<Utc>,
    /// When the item was last modified.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for opening a new sale.
#[derive(Debug, Clone)]
pub struct CreateSaleInput {
    /// Human-facing sale number (3 to 20 characters).
    pub sale_number: String,
    /// Customer ID.
    pub customer_id: CustomerId,
    /// Customer display name.
    pub customer_name: String,
    /// Branch ID.
    pub branch_id: BranchId,
    /// Branch display name.
    pub branch_name: String,
    /// Sale date; defaults to the creation time.
    pub sale_date: Option<DateTime<Utc>>,
}

/// Input for adding a line item to a sale.
#[derive(Debug, Clone)]
pub struct AddSaleItemInput {
    /// Target sale.
    pub sale_id: SaleId,
    /// Product ID.
    pub product_id: ProductId,
    /// Product display name.
    pub product_name: String,
    /// Units to sell.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: Decimal,
}

/// Summary row for sale listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleSummary {
    /// Sale ID.
    pub id: SaleId,
    /// Human-facing sale number.
    pub sale_number: String,
    /// Date of the sale.
    pub sale_date: DateTime<Utc>,
    /// Customer display name.
    pub customer_name: String,
    /// Branch display name.
    pub branch_name: String,
    /// Sale total.
    pub total_amount: Decimal,
    /// Sale status.
    pub status: SaleStatus,
    /// When the sale was created.
    pub created_at: DateTime<Utc>,
}
