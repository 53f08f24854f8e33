//! Parties domain module: customers that order lines are sold to.

pub mod customer;

pub use customer::{Customer, RegisterCustomer};
