//! Entity and command validation.
//!
//! Validation never fails fast and never mutates: it collects every broken
//! rule into a [`ValidationResult`] for the caller to report.

use rust_decimal::Decimal;

use salesdesk_shared::ValidationResult;

use crate::sales::item::SaleItem;
use crate::sales::sale::{MAX_ITEMS_PER_SALE, Sale};
use crate::sales::types::{AddSaleItemInput, CreateSaleInput, SaleItemStatus, SaleStatus};

/// Minimum sale number length.
pub const SALE_NUMBER_MIN_LEN: usize = 3;
/// Maximum sale number length.
pub const SALE_NUMBER_MAX_LEN: usize = 20;
/// Maximum customer and branch name length.
pub const NAME_MAX_LEN: usize = 100;
/// Maximum product name length.
pub const PRODUCT_NAME_MAX_LEN: usize = 200;
/// Decimal places a unit price may carry.
pub const PRICE_MAX_SCALE: u32 = 2;
/// Decimal places a discount rate may carry.
pub const DISCOUNT_MAX_SCALE: u32 = 4;

impl Sale {
    /// Checks the sale and all of its items.
    ///
    /// Item failures are reported under `items[i].<field>`.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::valid();

        sale_number_rules(&mut result, self.sale_number());
        required_id(&mut result, "customer_id", "Customer ID", self.customer_id().is_nil());
        name_rules(&mut result, "customer_name", "Customer name", self.customer_name());
        required_id(&mut result, "branch_id", "Branch ID", self.branch_id().is_nil());
        name_rules(&mut result, "branch_name", "Branch name", self.branch_name());

        if self.status() == SaleStatus::Unknown {
            result.push("status", "not_equal", "Sale status cannot be Unknown.");
        }

        if self.status() == SaleStatus::Completed {
            if self.active_items().next().is_none() {
                result.push(
                    "items",
                    "not_empty",
                    "A completed sale must have at least one confirmed item.",
                );
            }
        } else if self.items().is_empty() {
            result.push("items", "not_empty", "A sale must have at least one item.");
        }

        for (index, item) in self.items().iter().enumerate() {
            result.merge_prefixed(&format!("items[{index}]"), item.validate());
        }

        result
    }
}

impl SaleItem {
    /// Checks the item's fields.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::valid();

        required_id(&mut result, "product_id", "Product ID", self.product_id().is_nil());
        product_name_rules(&mut result, self.product_name());
        quantity_rules(&mut result, self.quantity());
        unit_price_rules(&mut result, self.unit_price());

        if self.discount() < Decimal::ZERO || self.discount() > Decimal::ONE {
            result.push(
                "discount",
                "inclusive_between",
                "Discount must be between 0 and 1.",
            );
        }
        if self.discount().normalize().scale() > DISCOUNT_MAX_SCALE {
            result.push(
                "discount",
                "precision",
                "Discount must have at most 4 decimal places.",
            );
        }

        if self.status() == SaleItemStatus::Unknown {
            result.push("status", "not_equal", "Item status cannot be Unknown.");
        }

        result
    }
}

impl CreateSaleInput {
    /// Checks the fields of a new sale.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::valid();

        sale_number_rules(&mut result, &self.sale_number);
        required_id(&mut result, "customer_id", "Customer ID", self.customer_id.is_nil());
        name_rules(&mut result, "customer_name", "Customer name", &self.customer_name);
        required_id(&mut result, "branch_id", "Branch ID", self.branch_id.is_nil());
        name_rules(&mut result, "branch_name", "Branch name", &self.branch_name);

        result
    }
}

impl AddSaleItemInput {
    /// Checks the fields of a new line item.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::valid();

        required_id(&mut result, "sale_id", "Sale ID", self.sale_id.is_nil());
        required_id(&mut result, "product_id", "Product ID", self.product_id.is_nil());
        product_name_rules(&mut result, &self.product_name);
        quantity_rules(&mut result, self.quantity);
        unit_price_rules(&mut result, self.unit_price);

        result
    }
}

/// Checks a requested item quantity.
pub fn validate_quantity(quantity: u32) -> ValidationResult {
    let mut result = ValidationResult::valid();
    quantity_rules(&mut result, quantity);
    result
}

fn sale_number_rules(result: &mut ValidationResult, sale_number: &str) {
    let len = sale_number.trim().chars().count();
    if len == 0 {
        result.push("sale_number", "not_empty", "Sale number is required.");
    } else if len < SALE_NUMBER_MIN_LEN {
        result.push(
            "sale_number",
            "min_length",
            format!("Sale number must be at least {SALE_NUMBER_MIN_LEN} characters long."),
        );
    } else if len > SALE_NUMBER_MAX_LEN {
        result.push(
            "sale_number",
            "max_length",
            format!("Sale number cannot be longer than {SALE_NUMBER_MAX_LEN} characters."),
        );
    }
}

fn required_id(result: &mut ValidationResult, field: &str, label: &str, is_nil: bool) {
    if is_nil {
        result.push(field, "not_empty", format!("{label} is required."));
    }
}

fn name_rules(result: &mut ValidationResult, field: &str, label: &str, value: &str) {
    if value.trim().is_empty() {
        result.push(field, "not_empty", format!("{label} is required."));
    } else if value.chars().count() > NAME_MAX_LEN {
        result.push(
            field,
            "max_length",
            format!("{label} cannot be longer than {NAME_MAX_LEN} characters."),
        );
    }
}

fn product_name_rules(result: &mut ValidationResult, value: &str) {
    if value.trim().is_empty() {
        result.push("product_name", "not_empty", "Product name is required.");
    } else if value.chars().count() > PRODUCT_NAME_MAX_LEN {
        result.push(
            "product_name",
            "max_length",
            format!("Product name cannot be longer than {PRODUCT_NAME_MAX_LEN} characters."),
        );
    }
}

fn quantity_rules(result: &mut ValidationResult, quantity: u32) {
    if quantity == 0 {
        result.push(
            "quantity",
            "greater_than",
            "Quantity must be greater than zero.",
        );
    } else if quantity > MAX_ITEMS_PER_SALE {
        result.push(
            "quantity",
            "less_than_or_equal",
            format!("Quantity cannot exceed {MAX_ITEMS_PER_SALE} units per product."),
        );
    }
}

fn unit_price_rules(result: &mut ValidationResult, unit_price: Decimal) {
    if unit_price <= Decimal::ZERO {
        result.push(
            "unit_price",
            "greater_than",
            "Unit price must be greater than zero.",
        );
    }
    if unit_price.normalize().scale() > PRICE_MAX_SCALE {
        result.push(
            "unit_price",
            "precision",
            "Unit price must have at most 2 decimal places.",
        );
    }
}
