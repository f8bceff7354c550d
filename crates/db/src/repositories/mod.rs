//! Repository implementations for database operations.
//!
//! Repositories provide a clean abstraction over database operations,
//! encapsulating query logic and providing type-safe interfaces.

pub mod sale;


pub use sale::SaleRepository;
