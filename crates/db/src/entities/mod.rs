//! `SeaORM` entities.

pub mod prelude;

pub mod sale_items;
pub mod sales;
