//! Business rules that gate sale mutations.
//!
//! Each rule is a stateless value implementing [`Specification`] for the
//! entity it inspects.

use crate::sales::item::SaleItem;
use crate::sales::sale::{MAX_ITEMS_PER_SALE, Sale};

/// Quantity at or below which an item earns no tiered discount.
pub const MIN_DISCOUNT_QUANTITY: u32 = 4;

/// A predicate over a candidate entity.
pub trait Specification<T: ?Sized> {
    /// Returns true if the candidate satisfies the rule.
    fn is_satisfied_by(&self, candidate: &T) -> bool;
}

/// Items can only be added, changed or cancelled while the sale is pending.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifySaleItemSpecification;

impl Specification<Sale> for ModifySaleItemSpecification {
    fn is_satisfied_by(&self, sale: &Sale) -> bool {
        sale.status().is_editable()
    }
}

/// An item may not exceed [`MAX_ITEMS_PER_SALE`] units.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaleItemQuantityLimitSpecification;

impl Specification<u32> for SaleItemQuantityLimitSpecification {
    fn is_satisfied_by(&self, quantity: &u32) -> bool {
        *quantity <= MAX_ITEMS_PER_SALE
    }
}

impl Specification<SaleItem> for SaleItemQuantityLimitSpecification {
    fn is_satisfied_by(&self, item: &SaleItem) -> bool {
        <Self as Specification<u32>>::is_satisfied_by(self, &item.quantity())
    }
}

/// An item qualifies for a tiered discount above [`MIN_DISCOUNT_QUANTITY`] units.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaleItemDiscountRangeSpecification;

impl Specification<u32> for SaleItemDiscountRangeSpecification {
    fn is_satisfied_by(&self, quantity: &u32) -> bool {
        *quantity > MIN_DISCOUNT_QUANTITY
    }
}

impl Specification<SaleItem> for SaleItemDiscountRangeSpecification {
    fn is_satisfied_by(&self, item: &SaleItem) -> bool {
        <Self as Specification<u32>>::is_satisfied_by(self, &item.quantity())
    }
}
