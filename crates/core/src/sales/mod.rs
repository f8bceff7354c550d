//! Sales domain for Salesdesk.
//!
//! A [`Sale`] is the aggregate root. It owns its [`SaleItem`]s and is the only
//! way to change them. Discounts come from a pluggable [`DiscountPolicy`],
//! and mutations are gated by the rules in [`specification`].
//!
//! # Modules
//!
//! - `types` - Statuses, persistence records and command inputs
//! - `error` - Sales error types
//! - `item` - Sale line items
//! - `sale` - The sale aggregate and its state machine
//! - `policy` - Discount policies
//! - `specification` - Business rules gating mutations
//! - `validation` - Entity and command validation
//! - `store` - Storage boundary
//! - `service` - Sale commands

pub mod error;
pub mod item;
pub mod policy;
pub mod sale;
pub mod service;
pub mod specification;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod sale_props;

pub use error::{SaleError, SaleErrorKind};
pub use item::SaleItem;
pub use policy::{
    DiscountPolicy, FlatRateDiscountPolicy, QuantityTierDiscountPolicy,
    discount_policy_from_settings,
};
pub use sale::{MAX_ITEMS_PER_SALE, Sale};
pub use service::SaleService;
pub use specification::{
    MIN_DISCOUNT_QUANTITY, ModifySaleItemSpecification, SaleItemDiscountRangeSpecification,
    SaleItemQuantityLimitSpecification, Specification,
};
pub use store::SaleStore;
pub use types::{
    AddSaleItemInput, CreateSaleInput, SaleItemRecord, SaleItemStatus, SaleRecord, SaleStatus,
    SaleSummary,
};
pub use validation::{DISCOUNT_MAX_SCALE, PRICE_MAX_SCALE, validate_quantity};
