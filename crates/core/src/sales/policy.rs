//! Discount policies.
//!
//! A policy maps a line item to a discount rate. The sale holds an optional
//! shared reference to one and applies it to every item it touches; the item
//! clamps whatever the policy returns into [0, 1].

use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

use salesdesk_shared::DiscountPolicySettings;

use crate::sales::error::SaleError;
use crate::sales::item::SaleItem;
use crate::sales::sale::MAX_ITEMS_PER_SALE;
use crate::sales::specification::{SaleItemDiscountRangeSpecification, Specification};

/// Computes the discount rate for a line item.
pub trait DiscountPolicy: fmt::Debug + Send + Sync {
    /// Returns the discount rate for `item`.
    ///
    /// Implementations should return a fraction in [0, 1]; out-of-range
    /// values are clamped by the caller.
    fn discount_for(&self, item: &SaleItem) -> Result<Decimal, SaleError>;
}

/// Quantity-tiered discount.
///
/// | Quantity | Discount |
/// |---|---|
/// | 1-4 | 0% |
/// | 5-9 | 10% |
/// | 10-20 | 20% |
///
/// Any other quantity has no tier and fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantityTierDiscountPolicy;

impl DiscountPolicy for QuantityTierDiscountPolicy {
    fn discount_for(&self, item: &SaleItem) -> Result<Decimal, SaleError> {
        let quantity = item.quantity();

        if quantity > 0 && !SaleItemDiscountRangeSpecification.is_satisfied_by(item) {
            return Ok(Decimal::ZERO);
        }

        match quantity {
            5..=9 => Ok(Decimal::new(10, 2)),
            10..=MAX_ITEMS_PER_SALE => Ok(Decimal::new(20, 2)),
            q => Err(SaleError::NoDiscountTier(q)),
        }
    }
}

/// The same rate for every item, regardless of quantity.
#[derive(Debug, Clone, Copy)]
pub struct FlatRateDiscountPolicy {
    rate: Decimal,
}

impl FlatRateDiscountPolicy {
    /// Creates a flat-rate policy.
    #[must_use]
    pub const fn new(rate: Decimal) -> Self {
        Self { rate }
    }

    /// The configured rate.
    #[must_use]
    pub const fn rate(&self) -> Decimal {
        self.rate
    }
}

impl DiscountPolicy for FlatRateDiscountPolicy {
    fn discount_for(&self, _item: &SaleItem) -> Result<Decimal, SaleError> {
        Ok(self.rate)
    }
}

/// Builds the shared policy described by configuration.
///
/// Returns `None` when sales should carry no automatic discount.
#[must_use]
pub fn discount_policy_from_settings(
    settings: &DiscountPolicySettings,
) -> Option<Arc<dyn DiscountPolicy>> {
    match settings {
        DiscountPolicySettings::None => None,
        DiscountPolicySettings::QuantityTier => Some(Arc::new(QuantityTierDiscountPolicy)),
        DiscountPolicySettings::FlatRate { rate } => {
            Some(Arc::new(FlatRateDiscountPolicy::new(*rate)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use salesdesk_shared::types::{ProductId, SaleId};

    fn item_with_quantity(quantity: u32) -> SaleItem {
        SaleItem::new(SaleId::new(), ProductId::new(), "Coffee", quantity, dec!(2.00))
    }

    #[rstest]
    #[case(1, dec!(0))]
    #[case(4, dec!(0))]
    #[case(5, dec!(0.10))]
    #[case(9, dec!(0.10))]
    #[case(10, dec!(0.20))]
    #[case(20, dec!(0.20))]
    fn test_quantity_tiers(#[case] quantity: u32, #[case] expected: Decimal) {
        let discount = QuantityTierDiscountPolicy
            .discount_for(&item_with_quantity(quantity))
            .unwrap();
        assert_eq!(discount, expected);
    }

    #[rstest]
    #[case(0)]
    #[case(21)]
    #[case(100)]
    fn test_quantity_without_tier(#[case] quantity: u32) {
        let err = QuantityTierDiscountPolicy
            .discount_for(&item_with_quantity(quantity))
            .unwrap_err();
        assert_eq!(err, SaleError::NoDiscountTier(quantity));
    }

    #[test]
    fn test_flat_rate_ignores_quantity() {
        let policy = FlatRateDiscountPolicy::new(dec!(0.05));
        assert_eq!(policy.discount_for(&item_with_quantity(1)).unwrap(), dec!(0.05));
        assert_eq!(policy.discount_for(&item_with_quantity(15)).unwrap(), dec!(0.05));
    }

    #[test]
    fn test_from_settings() {
        assert!(discount_policy_from_settings(&DiscountPolicySettings::None).is_none());

        let tier = discount_policy_from_settings(&DiscountPolicySettings::QuantityTier).unwrap();
        assert_eq!(tier.discount_for(&item_with_quantity(12)).unwrap(), dec!(0.20));

        let flat = discount_policy_from_settings(&DiscountPolicySettings::FlatRate {
            rate: dec!(0.15),
        })
        .unwrap();
        assert_eq!(flat.discount_for(&item_with_quantity(3)).unwrap(), dec!(0.15));
    }
}
