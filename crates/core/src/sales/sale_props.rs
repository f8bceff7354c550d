//! Property-based tests for the `Sale` aggregate.
//!
//! Random sequences of item operations are applied to a sale and the
//! aggregate invariants are checked after every step, whether the step
//! succeeded or not.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;

use salesdesk_shared::types::{BranchId, CustomerId, ProductId};

use crate::sales::error::SaleError;
use crate::sales::item::SaleItem;
use crate::sales::policy::{DiscountPolicy, QuantityTierDiscountPolicy};
use crate::sales::sale::Sale;
use crate::sales::types::SaleStatus;

#[derive(Debug, Clone)]
enum ItemOp {
    Add { product: usize, quantity: u32, price_cents: i64 },
    Update { product: usize, quantity: u32 },
    Cancel { product: usize },
}

#[derive(Debug)]
struct FixedRate(Decimal);

impl DiscountPolicy for FixedRate {
    fn discount_for(&self, _item: &SaleItem) -> Result<Decimal, SaleError> {
        Ok(self.0)
    }
}

fn arb_op() -> impl Strategy<Value = ItemOp> {
    prop_oneof![
        (0usize..4, 0u32..=25, 1i64..100_000).prop_map(|(product, quantity, price_cents)| {
            ItemOp::Add {
                product,
                quantity,
                price_cents,
            }
        }),
        (0usize..4, 0u32..=25).prop_map(|(product, quantity)| ItemOp::Update { product, quantity }),
        (0usize..4).prop_map(|product| ItemOp::Cancel { product }),
    ]
}

fn arb_policy() -> impl Strategy<Value = Option<Arc<dyn DiscountPolicy>>> {
    prop_oneof![
        Just(None),
        Just(Some(Arc::new(QuantityTierDiscountPolicy) as Arc<dyn DiscountPolicy>)),
    ]
}

fn new_sale() -> Sale {
    Sale::create("S0001", CustomerId::new(), "Alice", BranchId::new(), "Main")
}

fn apply(sale: &mut Sale, products: &[ProductId], op: &ItemOp) -> Result<(), SaleError> {
    match *op {
        ItemOp::Add {
            product,
            quantity,
            price_cents,
        } => sale
            .add_item(products[product], "Product", quantity, Decimal::new(price_cents, 2))
            .map(|_| ()),
        ItemOp::Update { product, quantity } => {
            sale.update_item_quantity(products[product], quantity)
        }
        ItemOp::Cancel { product } => sale.cancel_item(products[product]),
    }
}

fn expected_total(sale: &Sale) -> Decimal {
    sale.items()
        .iter()
        .filter(|item| item.is_active())
        .map(|item| Decimal::from(item.quantity()) * item.unit_price() * (Decimal::ONE - item.discount()))
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Total always equals the sum over active items, and a failed
    /// operation leaves the total unchanged.
    #[test]
    fn prop_total_matches_active_items(
        policy in arb_policy(),
        ops in prop::collection::vec(arb_op(), 1..30)
    ) {
        let products: Vec<ProductId> = (0..4).map(|_| ProductId::new()).collect();
        let mut sale = new_sale();
        sale.attach_discount_policy(policy);

        for op in &ops {
            let before = sale.total_amount();
            if apply(&mut sale, &products, op).is_err() {
                prop_assert_eq!(sale.total_amount(), before);
            }
            prop_assert_eq!(sale.total_amount(), expected_total(&sale));
        }
    }

    /// At most one active item per product, whatever the operations.
    #[test]
    fn prop_single_active_item_per_product(
        ops in prop::collection::vec(arb_op(), 1..30)
    ) {
        let products: Vec<ProductId> = (0..4).map(|_| ProductId::new()).collect();
        let mut sale = new_sale();

        for op in &ops {
            let _ = apply(&mut sale, &products, op);

            let mut seen = HashSet::new();
            for item in sale.active_items() {
                prop_assert!(seen.insert(item.product_id()));
            }
        }
    }

    /// Active item quantities never exceed the per-product cap.
    #[test]
    fn prop_quantities_within_cap(
        ops in prop::collection::vec(arb_op(), 1..30)
    ) {
        let products: Vec<ProductId> = (0..4).map(|_| ProductId::new()).collect();
        let mut sale = new_sale();

        for op in &ops {
            let _ = apply(&mut sale, &products, op);
        }
        for item in sale.items() {
            prop_assert!(item.quantity() <= 20);
        }
    }

    /// Item operations fail on any sale that is not pending.
    #[test]
    fn prop_closed_sale_rejects_item_ops(
        complete_first in any::<bool>(),
        op in arb_op()
    ) {
        let products: Vec<ProductId> = (0..4).map(|_| ProductId::new()).collect();
        let mut sale = new_sale();
        if complete_first {
            sale.complete().unwrap();
        } else {
            sale.cancel();
        }
        let status = sale.status();

        let result = apply(&mut sale, &products, &op);

        let is_invalid_status = matches!(result, Err(SaleError::InvalidStatus { .. }));
        prop_assert!(is_invalid_status);
        prop_assert!(sale.items().is_empty());
        prop_assert_eq!(sale.status(), status);
    }

    /// Cancelling or completing twice ends in the same state as once.
    #[test]
    fn prop_transitions_are_idempotent(
        ops in prop::collection::vec(arb_op(), 0..10),
        cancel in any::<bool>()
    ) {
        let products: Vec<ProductId> = (0..4).map(|_| ProductId::new()).collect();
        let mut sale = new_sale();
        for op in &ops {
            let _ = apply(&mut sale, &products, op);
        }

        if cancel {
            prop_assert!(sale.cancel());
            let total = sale.total_amount();
            prop_assert!(!sale.cancel());
            prop_assert_eq!(sale.status(), SaleStatus::Cancelled);
            prop_assert_eq!(sale.total_amount(), total);
        } else {
            prop_assert_eq!(sale.complete(), Ok(true));
            let completed_at = sale.completed_at();
            prop_assert_eq!(sale.complete(), Ok(false));
            prop_assert_eq!(sale.status(), SaleStatus::Completed);
            prop_assert_eq!(sale.completed_at(), completed_at);
        }
    }

    /// Any policy output is clamped into [0, 1].
    #[test]
    fn prop_discount_is_clamped(
        raw in -100_000i64..100_000i64,
        quantity in 1u32..=20
    ) {
        let rate = Decimal::new(raw, 2);
        let mut sale = new_sale();
        sale.attach_discount_policy(Some(Arc::new(FixedRate(rate))));

        let item = sale
            .add_item(ProductId::new(), "Product", quantity, Decimal::new(1_000, 2))
            .unwrap();

        prop_assert!(item.discount() >= Decimal::ZERO);
        prop_assert!(item.discount() <= Decimal::ONE);
        prop_assert_eq!(item.discount(), rate.clamp(Decimal::ZERO, Decimal::ONE));
        prop_assert!(sale.total_amount() >= Decimal::ZERO);
    }
}
