//! Organization module: users and the reporting hierarchy.
//!
//! Answers "who works under whom" for report scoping and drill-down
//! navigation. Pure domain logic (no IO, no HTTP, no storage).

pub mod hierarchy;
pub mod user;

pub use hierarchy::OrgHierarchy;
pub use user::{CreateUser, User};
