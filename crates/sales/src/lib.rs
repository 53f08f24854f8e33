//! Sales domain module: order lines and the order engine.
//!
//! This crate turns a multi-line order request into one invoice, drawing cost
//! from the FIFO ledger. Pure, deterministic domain logic (no IO, no HTTP, no
//! storage); the caller supplies working copies of the stock it may consume.

pub mod engine;
pub mod line;

pub use engine::{CreateOrder, DuePolicy, Invoice, OrderEngine, OrderLineRequest};
pub use line::{OrderLine, PaymentStatus};
