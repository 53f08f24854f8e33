//! Product catalog domain module.
//!
//! Products and categories as consumed by the ledger and the category gate.
//! Pure domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod product;

pub use category::{Category, CreateCategory};
pub use product::{CreateProduct, Product};
