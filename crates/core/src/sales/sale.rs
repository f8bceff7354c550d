//! The `Sale` aggregate root.
//!
//! Every change to a sale or its items goes through a method here. Each
//! method either fully applies or returns an error with the sale unchanged,
//! and `total_amount` is recomputed after anything that can affect it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use salesdesk_shared::types::{BranchId, CustomerId, ProductId, SaleId};

use crate::sales::error::SaleError;
use crate::sales::item::SaleItem;
use crate::sales::policy::DiscountPolicy;
use crate::sales::specification::{
    ModifySaleItemSpecification, SaleItemQuantityLimitSpecification, Specification,
};
use crate::sales::types::{SaleItemRecord, SaleRecord, SaleStatus};

/// Maximum units of a single product on one sale.
pub const MAX_ITEMS_PER_SALE: u32 = 20;

/// A sale and the line items it owns.
#[derive(Debug, Clone)]
pub struct Sale {
    id: SaleId,
    sale_number: String,
    sale_date: DateTime<Utc>,
    customer_id: CustomerId,
    customer_name: String,
    branch_id: BranchId,
    branch_name: String,
    total_amount: Decimal,
    status: SaleStatus,
    items: Vec<SaleItem>,
    discount_policy: Option<Arc<dyn DiscountPolicy>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Sale {
    /// Opens a new pending sale with no items and no discount policy.
    pub fn create(
        sale_number: impl Into<String>,
        customer_id: CustomerId,
        customer_name: impl Into<String>,
        branch_id: BranchId,
        branch_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SaleId::new(),
            sale_number: sale_number.into(),
            sale_date: now,
            customer_id,
            customer_name: customer_name.into(),
            branch_id,
            branch_name: branch_name.into(),
            total_amount: Decimal::ZERO,
            status: SaleStatus::Pending,
            items: Vec::new(),
            discount_policy: None,
            created_at: now,
            updated_at: None,
            completed_at: None,
        }
    }

    /// Overrides the sale date, which defaults to the creation time.
    #[must_use]
    pub fn with_sale_date(mut self, sale_date: DateTime<Utc>) -> Self {
        self.sale_date = sale_date;
        self
    }

    /// Rebuilds a sale from persisted records.
    ///
    /// The stored total is ignored and recomputed from the items. No
    /// discount policy is attached.
    #[must_use]
    pub fn restore(record: SaleRecord, items: Vec<SaleItemRecord>) -> Self {
        let mut sale = Self {
            id: record.id,
            sale_number: record.sale_number,
            sale_date: record.sale_date,
            customer_id: record.customer_id,
            customer_name: record.customer_name,
            branch_id: record.branch_id,
            branch_name: record.branch_name,
            total_amount: Decimal::ZERO,
            status: record.status,
            items: items.into_iter().map(SaleItem::restore).collect(),
            discount_policy: None,
            created_at: record.created_at,
            updated_at: record.updated_at,
            completed_at: record.completed_at,
        };
        sale.recalculate_total();
        sale
    }

    /// Sale ID.
    pub fn id(&self) -> SaleId {
        self.id
    }

    /// Human-facing sale number.
    pub fn sale_number(&self) -> &str {
        &self.sale_number
    }

    /// Date of the sale.
    pub fn sale_date(&self) -> DateTime<Utc> {
        self.sale_date
    }

    /// Customer ID.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Customer display name.
    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    /// Branch ID.
    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    /// Branch display name.
    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    /// Sum of `total_price` over active items.
    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Sale status.
    pub fn status(&self) -> SaleStatus {
        self.status
    }

    /// Every stored item, cancelled ones included.
    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    /// Items that count toward the total.
    pub fn active_items(&self) -> impl Iterator<Item = &SaleItem> {
        self.items.iter().filter(|item| item.is_active())
    }

    /// The attached discount policy, if any.
    pub fn discount_policy(&self) -> Option<&Arc<dyn DiscountPolicy>> {
        self.discount_policy.as_ref()
    }

    /// When the sale was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the sale was last modified.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// When the sale was completed.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Cancels the sale.
    ///
    /// Returns `false` if it was already cancelled. Completed sales can be
    /// cancelled too.
    pub fn cancel(&mut self) -> bool {
        if self.status == SaleStatus::Cancelled {
            return false;
        }
        self.status = SaleStatus::Cancelled;
        self.touch();
        true
    }

    /// Completes the sale.
    ///
    /// Returns `Ok(false)` if it was already completed.
    ///
    /// # Errors
    ///
    /// Returns `CompleteCancelled` if the sale has been cancelled.
    pub fn complete(&mut self) -> Result<bool, SaleError> {
        match self.status {
            SaleStatus::Completed => Ok(false),
            SaleStatus::Cancelled => Err(SaleError::CompleteCancelled),
            SaleStatus::Pending | SaleStatus::Unknown => {
                let now = Utc::now();
                self.status = SaleStatus::Completed;
                self.updated_at = Some(now);
                self.completed_at = Some(now);
                Ok(true)
            }
        }
    }

    /// Adds a confirmed item and applies the current discount policy to it.
    ///
    /// # Errors
    ///
    /// Fails if the sale is not pending, the product already has an active
    /// item, the policy fails, or the quantity exceeds
    /// [`MAX_ITEMS_PER_SALE`].
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Result<SaleItem, SaleError> {
        self.ensure_modifiable("add an item to")?;

        let product_name = product_name.into();
        if self.get_item(product_id).is_some() {
            return Err(SaleError::DuplicateItem { product_name });
        }

        let mut item = SaleItem::new(self.id, product_id, product_name, quantity, unit_price);
        item.apply_discount_policy(self.discount_policy.as_deref())?;

        if !SaleItemQuantityLimitSpecification.is_satisfied_by(&item) {
            return Err(SaleError::QuantityLimitExceeded {
                max: MAX_ITEMS_PER_SALE,
            });
        }

        self.items.push(item.clone());
        self.recalculate_total();
        self.touch();
        Ok(item)
    }

    /// Returns the active item for `product_id`.
    pub fn get_item(&self, product_id: ProductId) -> Option<&SaleItem> {
        self.active_items()
            .find(|item| item.product_id() == product_id)
    }

    /// Changes an item's quantity and reapplies the discount policy.
    ///
    /// The active item for the product is preferred over plain first-match,
    /// so an earlier cancelled line never shadows a re-added one. When only
    /// cancelled items match, the first of them is targeted and the item
    /// rejects the change.
    ///
    /// # Errors
    ///
    /// Fails if the sale is not pending, no item matches, the item rejects
    /// the quantity, the quantity exceeds [`MAX_ITEMS_PER_SALE`], or the
    /// policy fails.
    pub fn update_item_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), SaleError> {
        self.ensure_modifiable("update the quantity of an item on")?;

        let index = self
            .items
            .iter()
            .position(|item| item.is_active() && item.product_id() == product_id)
            .or_else(|| {
                self.items
                    .iter()
                    .position(|item| item.product_id() == product_id)
            })
            .ok_or(SaleError::ItemNotInSale(product_id))?;

        let mut item = self.items[index].clone();
        item.update_quantity(quantity)?;

        if !SaleItemQuantityLimitSpecification.is_satisfied_by(&item) {
            return Err(SaleError::QuantityLimitExceeded {
                max: MAX_ITEMS_PER_SALE,
            });
        }

        item.apply_discount_policy(self.discount_policy.as_deref())?;

        self.items[index] = item;
        self.recalculate_total();
        self.touch();
        Ok(())
    }

    /// Cancels the active item for `product_id`.
    ///
    /// # Errors
    ///
    /// Fails if the sale is not pending or no active item matches.
    pub fn cancel_item(&mut self, product_id: ProductId) -> Result<(), SaleError> {
        self.ensure_modifiable("cancel an item on")?;

        let item = self
            .items
            .iter_mut()
            .find(|item| item.is_active() && item.product_id() == product_id)
            .ok_or(SaleError::ItemNotFound(product_id))?;
        item.cancel();

        self.recalculate_total();
        self.touch();
        Ok(())
    }

    /// Replaces the discount policy and reapplies it to every stored item,
    /// cancelled ones included. Only confirmed items count toward the total.
    ///
    /// If the policy fails for any item, neither the policy nor any discount
    /// changes.
    pub fn update_discount_policy(
        &mut self,
        policy: Option<Arc<dyn DiscountPolicy>>,
    ) -> Result<(), SaleError> {
        let mut items = self.items.clone();
        for item in &mut items {
            item.apply_discount_policy(policy.as_deref())?;
        }

        self.items = items;
        self.discount_policy = policy;
        self.recalculate_total();
        self.touch();
        Ok(())
    }

    /// Sets the policy used by later mutations without touching stored
    /// discounts.
    pub fn attach_discount_policy(&mut self, policy: Option<Arc<dyn DiscountPolicy>>) {
        self.discount_policy = policy;
    }

    fn ensure_modifiable(&self, action: &'static str) -> Result<(), SaleError> {
        if ModifySaleItemSpecification.is_satisfied_by(self) {
            Ok(())
        } else {
            Err(SaleError::InvalidStatus {
                action,
                status: self.status,
            })
        }
    }

    fn recalculate_total(&mut self) {
        self.total_amount = self.active_items().map(SaleItem::total_price).sum();
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

impl From<&Sale> for SaleRecord {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id,
            sale_number: sale.sale_number.clone(),
            sale_date: sale.sale_date,
            customer_id: sale.customer_id,
            customer_name: sale.customer_name.clone(),
            branch_id: sale.branch_id,
            branch_name: sale.branch_name.clone(),
            total_amount: sale.total_amount,
            status: sale.status,
            created_at: sale.created_at,
            updated_at: sale.updated_at,
            completed_at: sale.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sales::policy::QuantityTierDiscountPolicy;
    use crate::sales::types::SaleItemStatus;
    use rust_decimal_macros::dec;

    #[derive(Debug)]
    struct FixedRate(Decimal);

    impl DiscountPolicy for FixedRate {
        fn discount_for(&self, _item: &SaleItem) -> Result<Decimal, SaleError> {
            Ok(self.0)
        }
    }

    #[derive(Debug)]
    struct FailsAbove(u32);

    impl DiscountPolicy for FailsAbove {
        fn discount_for(&self, item: &SaleItem) -> Result<Decimal, SaleError> {
            if item.quantity() > self.0 {
                return Err(SaleError::NoDiscountTier(item.quantity()));
            }
            Ok(dec!(0.5))
        }
    }

    fn new_sale() -> Sale {
        Sale::create("S0001", CustomerId::new(), "Alice", BranchId::new(), "Main")
    }

    #[test]
    fn test_create_sale() {
        let sale = new_sale();

        assert_eq!(sale.status(), SaleStatus::Pending);
        assert_eq!(sale.total_amount(), Decimal::ZERO);
        assert_eq!(sale.sale_number(), "S0001");
        assert_eq!(sale.sale_date(), sale.created_at());
        assert!(sale.items().is_empty());
        assert!(sale.discount_policy().is_none());
        assert!(sale.updated_at().is_none());
    }

    #[test]
    fn test_add_item_without_policy() {
        let mut sale = new_sale();
        let item = sale
            .add_item(ProductId::new(), "Coffee", 2, dec!(50))
            .unwrap();

        assert_eq!(item.total_price(), dec!(100));
        assert_eq!(item.status(), SaleItemStatus::Confirmed);
        assert_eq!(item.sale_id(), sale.id());
        assert_eq!(sale.total_amount(), dec!(100));
        assert!(sale.updated_at().is_some());
    }

    #[test]
    fn test_add_item_over_cap_fails() {
        let mut sale = new_sale();
        let err = sale
            .add_item(ProductId::new(), "Coffee", 21, dec!(10))
            .unwrap_err();

        assert_eq!(err, SaleError::QuantityLimitExceeded { max: 20 });
        assert_eq!(sale.total_amount(), Decimal::ZERO);
        assert!(sale.items().is_empty());
    }

    #[test]
    fn test_add_duplicate_item_fails() {
        let mut sale = new_sale();
        let product = ProductId::new();
        sale.add_item(product, "Coffee", 1, dec!(10)).unwrap();

        let err = sale.add_item(product, "Coffee", 3, dec!(10)).unwrap_err();
        assert_eq!(
            err,
            SaleError::DuplicateItem {
                product_name: "Coffee".into()
            }
        );
        assert_eq!(sale.items().len(), 1);
    }

    #[test]
    fn test_add_item_applies_policy() {
        let mut sale = new_sale();
        sale.attach_discount_policy(Some(Arc::new(FixedRate(dec!(0.3)))));

        let item = sale
            .add_item(ProductId::new(), "Coffee", 1, dec!(10))
            .unwrap();

        assert_eq!(item.discount(), dec!(0.3));
        assert_eq!(item.total_price(), dec!(7));
        assert_eq!(sale.total_amount(), dec!(7));
    }

    #[test]
    fn test_add_item_policy_failure_leaves_sale_unchanged() {
        let mut sale = new_sale();
        sale.attach_discount_policy(Some(Arc::new(QuantityTierDiscountPolicy)));

        let err = sale
            .add_item(ProductId::new(), "Coffee", 25, dec!(1))
            .unwrap_err();

        assert_eq!(err, SaleError::NoDiscountTier(25));
        assert!(sale.items().is_empty());
        assert!(sale.updated_at().is_none());
    }

    #[test]
    fn test_re_add_after_cancel() {
        let mut sale = new_sale();
        let product = ProductId::new();
        sale.add_item(product, "Coffee", 1, dec!(10)).unwrap();
        sale.cancel_item(product).unwrap();

        sale.add_item(product, "Coffee", 2, dec!(10)).unwrap();

        assert_eq!(sale.items().len(), 2);
        assert_eq!(sale.active_items().count(), 1);
        assert_eq!(sale.total_amount(), dec!(20));
    }

    #[test]
    fn test_cancel_item() {
        let mut sale = new_sale();
        let product = ProductId::new();
        sale.add_item(product, "Coffee", 2, dec!(50)).unwrap();
        assert_eq!(sale.total_amount(), dec!(100));

        sale.cancel_item(product).unwrap();

        assert_eq!(sale.total_amount(), Decimal::ZERO);
        assert!(sale.get_item(product).is_none());
        assert_eq!(sale.items()[0].status(), SaleItemStatus::Cancelled);
    }

    #[test]
    fn test_cancel_missing_item() {
        let mut sale = new_sale();
        let product = ProductId::new();
        assert_eq!(
            sale.cancel_item(product),
            Err(SaleError::ItemNotFound(product))
        );

        sale.add_item(product, "Coffee", 1, dec!(10)).unwrap();
        sale.cancel_item(product).unwrap();
        assert_eq!(
            sale.cancel_item(product),
            Err(SaleError::ItemNotFound(product))
        );
    }

    #[test]
    fn test_update_item_quantity_reapplies_policy() {
        let mut sale = new_sale();
        sale.attach_discount_policy(Some(Arc::new(QuantityTierDiscountPolicy)));
        let product = ProductId::new();
        sale.add_item(product, "Coffee", 2, dec!(10)).unwrap();
        assert_eq!(sale.total_amount(), dec!(20));

        sale.update_item_quantity(product, 10).unwrap();

        let item = sale.get_item(product).unwrap();
        assert_eq!(item.quantity(), 10);
        assert_eq!(item.discount(), dec!(0.20));
        assert_eq!(sale.total_amount(), dec!(80));
    }

    #[test]
    fn test_update_item_quantity_errors() {
        let mut sale = new_sale();
        let product = ProductId::new();

        assert_eq!(
            sale.update_item_quantity(product, 2),
            Err(SaleError::ItemNotInSale(product))
        );

        sale.add_item(product, "Coffee", 2, dec!(10)).unwrap();
        assert_eq!(
            sale.update_item_quantity(product, 0),
            Err(SaleError::ZeroQuantity)
        );
        assert_eq!(
            sale.update_item_quantity(product, 21),
            Err(SaleError::QuantityLimitExceeded { max: 20 })
        );
        assert_eq!(sale.get_item(product).unwrap().quantity(), 2);

        sale.cancel_item(product).unwrap();
        assert_eq!(
            sale.update_item_quantity(product, 3),
            Err(SaleError::ItemCancelled)
        );
    }

    #[test]
    fn test_update_quantity_prefers_active_item() {
        let mut sale = new_sale();
        let product = ProductId::new();
        sale.add_item(product, "Coffee", 1, dec!(10)).unwrap();
        sale.cancel_item(product).unwrap();
        sale.add_item(product, "Coffee", 1, dec!(10)).unwrap();

        sale.update_item_quantity(product, 4).unwrap();

        assert_eq!(sale.items()[0].quantity(), 1);
        assert_eq!(sale.items()[1].quantity(), 4);
        assert_eq!(sale.total_amount(), dec!(40));
    }

    #[test]
    fn test_mutations_require_pending() {
        let mut sale = new_sale();
        let product = ProductId::new();
        sale.add_item(product, "Coffee", 1, dec!(10)).unwrap();
        sale.complete().unwrap();

        let err = sale
            .add_item(ProductId::new(), "Tea", 1, dec!(5))
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot add an item to a completed sale");

        let err = sale.update_item_quantity(product, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot update the quantity of an item on a completed sale"
        );

        let err = sale.cancel_item(product).unwrap_err();
        assert_eq!(err.to_string(), "Cannot cancel an item on a completed sale");
        assert_eq!(sale.total_amount(), dec!(10));
    }

    #[test]
    fn test_complete() {
        let mut sale = new_sale();
        assert_eq!(sale.complete(), Ok(true));
        assert_eq!(sale.status(), SaleStatus::Completed);
        assert!(sale.completed_at().is_some());
        assert_eq!(sale.updated_at(), sale.completed_at());

        assert_eq!(sale.complete(), Ok(false));
    }

    #[test]
    fn test_complete_cancelled_fails() {
        let mut sale = new_sale();
        assert!(sale.cancel());
        assert_eq!(sale.complete(), Err(SaleError::CompleteCancelled));
        assert_eq!(sale.status(), SaleStatus::Cancelled);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut sale = new_sale();
        assert!(sale.cancel());
        assert!(!sale.cancel());
        assert_eq!(sale.status(), SaleStatus::Cancelled);
    }

    #[test]
    fn test_completed_sale_can_be_cancelled() {
        let mut sale = new_sale();
        sale.complete().unwrap();
        assert!(sale.cancel());
        assert_eq!(sale.status(), SaleStatus::Cancelled);
    }

    #[test]
    fn test_update_discount_policy_reaches_cancelled_items() {
        let mut sale = new_sale();
        let kept = ProductId::new();
        let dropped = ProductId::new();
        sale.add_item(kept, "Coffee", 2, dec!(10)).unwrap();
        sale.add_item(dropped, "Tea", 2, dec!(10)).unwrap();
        sale.cancel_item(dropped).unwrap();

        sale.update_discount_policy(Some(Arc::new(FixedRate(dec!(0.5)))))
            .unwrap();

        assert_eq!(sale.get_item(kept).unwrap().discount(), dec!(0.5));
        assert_eq!(sale.items()[1].status(), SaleItemStatus::Cancelled);
        assert_eq!(sale.items()[1].discount(), dec!(0.5));
        assert_eq!(sale.total_amount(), dec!(10));
        assert!(sale.discount_policy().is_some());
    }

    #[test]
    fn test_update_discount_policy_failure_is_atomic() {
        let mut sale = new_sale();
        sale.attach_discount_policy(Some(Arc::new(FixedRate(dec!(0.1)))));
        sale.add_item(ProductId::new(), "Coffee", 2, dec!(10)).unwrap();
        sale.add_item(ProductId::new(), "Tea", 8, dec!(1)).unwrap();
        assert_eq!(sale.total_amount(), dec!(25.2));

        let err = sale
            .update_discount_policy(Some(Arc::new(FailsAbove(5))))
            .unwrap_err();

        assert_eq!(err, SaleError::NoDiscountTier(8));
        assert!(sale.items().iter().all(|item| item.discount() == dec!(0.1)));
        assert_eq!(sale.total_amount(), dec!(25.2));
    }

    #[test]
    fn test_update_discount_policy_fails_on_cancelled_item() {
        let mut sale = new_sale();
        let dropped = ProductId::new();
        sale.add_item(ProductId::new(), "Coffee", 2, dec!(10)).unwrap();
        sale.add_item(dropped, "Tea", 8, dec!(1)).unwrap();
        sale.cancel_item(dropped).unwrap();

        let err = sale
            .update_discount_policy(Some(Arc::new(FailsAbove(5))))
            .unwrap_err();

        assert_eq!(err, SaleError::NoDiscountTier(8));
        assert!(sale.items().iter().all(|item| item.discount() == Decimal::ZERO));
        assert!(sale.discount_policy().is_none());
        assert_eq!(sale.total_amount(), dec!(20));
    }

    #[test]
    fn test_restore_recomputes_total() {
        let mut sale = new_sale();
        let product = ProductId::new();
        sale.add_item(product, "Coffee", 2, dec!(10)).unwrap();
        sale.add_item(ProductId::new(), "Tea", 1, dec!(5)).unwrap();
        sale.cancel_item(product).unwrap();

        let mut record = SaleRecord::from(&sale);
        record.total_amount = dec!(999);
        let items = sale.items().iter().map(SaleItemRecord::from).collect();

        let restored = Sale::restore(record, items);

        assert_eq!(restored.total_amount(), dec!(5));
        assert_eq!(restored.items(), sale.items());
        assert!(restored.discount_policy().is_none());
    }

    #[test]
    fn test_attach_policy_keeps_stored_discounts() {
        let mut sale = new_sale();
        sale.add_item(ProductId::new(), "Coffee", 10, dec!(1)).unwrap();

        sale.attach_discount_policy(Some(Arc::new(QuantityTierDiscountPolicy)));

        assert_eq!(sale.items()[0].discount(), Decimal::ZERO);
        assert_eq!(sale.total_amount(), dec!(10));
    }
}
