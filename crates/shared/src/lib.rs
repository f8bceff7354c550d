//! Shared types, errors, and configuration for Salesdesk.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Validation result types surfaced to API clients
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;
pub mod validation;

pub use config::{AppConfig, DiscountPolicySettings, SalesConfig};
pub use error::{AppError, AppResult};
pub use validation::{ValidationErrorDetail, ValidationResult};
