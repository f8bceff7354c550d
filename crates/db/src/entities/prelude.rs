//! Entity re-exports.

pub use super::sale_items::Entity as SaleItems;
pub use super::sales::Entity as Sales;
