//! `wholesale-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the shared error taxonomy and fixed-point money helpers.

pub mod aggregate;
pub mod error;
pub mod id;
pub mod money;

pub use aggregate::AggregateRoot;
pub use error::{DomainError, DomainResult};
pub use id::{BatchId, CategoryId, CustomerId, InvoiceId, OrderLineId, ProductId, UserId};
pub use money::{COST_SCALE, saturating_sum, unit_cost_of};
