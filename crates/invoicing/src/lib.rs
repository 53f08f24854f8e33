//! Invoicing domain module.
//!
//! An invoice is not a stored row: it is the set of order lines sharing one
//! `InvoiceId`. This crate groups lines into invoices and applies the
//! whole-invoice Due → Paid transition. Pure domain logic.

pub mod invoice;

pub use invoice::{InvoiceView, MarkInvoicePaid, group_by_invoice};
