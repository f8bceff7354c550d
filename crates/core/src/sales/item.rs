//! Sale line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use salesdesk_shared::types::{ProductId, SaleId, SaleItemId};

use crate::sales::error::SaleError;
use crate::sales::policy::DiscountPolicy;
use crate::sales::types::{SaleItemRecord, SaleItemStatus};

/// A line on a sale: one product, a quantity, a unit price and a discount.
///
/// Items are owned by their [`Sale`](crate::sales::Sale) and only created
/// through it. `total_price` and `discount_amount` are derived on every
/// call and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleItem {
    id: SaleItemId,
    sale_id: SaleId,
    product_id: ProductId,
    product_name: String,
    quantity: u32,
    unit_price: Decimal,
    discount: Decimal,
    status: SaleItemStatus,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl SaleItem {
    /// Creates a confirmed item. Quantity and price are taken as given.
    pub(crate) fn new(
        sale_id: SaleId,
        product_id: ProductId,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: SaleItemId::new(),
            sale_id,
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
            discount: Decimal::ZERO,
            status: SaleItemStatus::Confirmed,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Rebuilds an item from its persisted record.
    #[must_use]
    pub fn restore(record: SaleItemRecord) -> Self {
        Self {
            id: record.id,
            sale_id: record.sale_id,
            product_id: record.product_id,
            product_name: record.product_name,
            quantity: record.quantity,
            unit_price: record.unit_price,
            discount: record.discount,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Item ID.
    pub fn id(&self) -> SaleItemId {
        self.id
    }

    /// Owning sale.
    pub fn sale_id(&self) -> SaleId {
        self.sale_id
    }

    /// Product ID.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Product display name.
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Units sold.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price per unit.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Discount rate in [0, 1].
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// Item status.
    pub fn status(&self) -> SaleItemStatus {
        self.status
    }

    /// When the item was added.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the item was last modified.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns true if the item counts toward the sale total.
    pub fn is_active(&self) -> bool {
        self.status == SaleItemStatus::Confirmed
    }

    /// `quantity × unit_price` before discount.
    pub fn gross_price(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    /// `quantity × unit_price × (1 − discount)`.
    pub fn total_price(&self) -> Decimal {
        self.gross_price() * (Decimal::ONE - self.discount)
    }

    /// Amount taken off by the discount.
    pub fn discount_amount(&self) -> Decimal {
        self.gross_price() - self.total_price()
    }

    /// Changes the quantity.
    ///
    /// The per-sale cap is not checked here; the sale enforces it.
    ///
    /// # Errors
    ///
    /// Returns `ItemCancelled` if the item is cancelled and `ZeroQuantity`
    /// if `quantity` is zero.
    pub fn update_quantity(&mut self, quantity: u32) -> Result<(), SaleError> {
        if self.status == SaleItemStatus::Cancelled {
            return Err(SaleError::ItemCancelled);
        }
        if quantity == 0 {
            return Err(SaleError::ZeroQuantity);
        }

        self.quantity = quantity;
        self.touch();
        Ok(())
    }

    /// Sets the discount from `policy`, or to zero when there is none.
    ///
    /// The policy result is clamped into [0, 1]. On failure the current
    /// discount is kept.
    pub fn apply_discount_policy(
        &mut self,
        policy: Option<&dyn DiscountPolicy>,
    ) -> Result<(), SaleError> {
        self.discount = match policy {
            Some(policy) => policy
                .discount_for(self)?
                .clamp(Decimal::ZERO, Decimal::ONE),
            None => Decimal::ZERO,
        };
        Ok(())
    }

    /// Marks the item cancelled. Cancelling twice is a no-op.
    pub fn cancel(&mut self) {
        if self.status == SaleItemStatus::Cancelled {
            return;
        }
        self.status = SaleItemStatus::Cancelled;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

impl From<&SaleItem> for SaleItemRecord {
    fn from(item: &SaleItem) -> Self {
        Self {
            id: item.id,
            sale_id: item.sale_id,
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: item.discount,
            status: item.status,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}
