//! Core business logic for Salesdesk.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, invariants, and calculations live here.
//!
//! # Modules
//!
//! - `sales` - The `Sale` aggregate, its line items, discount policies,
//!   specifications, and the application service that drives them

pub mod sales;
