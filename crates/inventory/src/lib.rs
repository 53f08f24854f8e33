//! Inventory ledger domain module.
//!
//! Per-product stock is an ordered list of purchase batches, consumed
//! oldest-first. Pure, deterministic domain logic (no IO, no HTTP, no storage);
//! adapters load a [`ProductStock`], let it decide, and persist the diff.

pub mod batch;
pub mod ledger;
pub mod unit;

pub use batch::{InventoryBatch, ReceiveStock};
pub use ledger::{BatchChange, BatchDraw, Consumption, ProductStock};
pub use unit::{Unit, UnitBreakdown};
