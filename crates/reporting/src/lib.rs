//! Reporting over the organization: team sales/profit rollups, team invoice
//! history, due-payment drill-down and per-user statistics.
//!
//! Every report is scoped to a subtree of the reporting hierarchy and fails
//! closed: an unknown or out-of-scope user is an error, never a partial figure.

pub mod aggregator;
pub mod views;

pub use aggregator::ReportingAggregator;
pub use views::{
    CustomerDue, DueSummary, MemberDue, MemberSummary, TeamInvoices, TeamReport, TeamReportBody,
    UserRef, UserStats,
};
