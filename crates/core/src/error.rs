//! Domain error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic business failures only. Every variant is raised before (or
/// instead of) any state change, so callers can surface it verbatim.
/// Storage failures live in the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or out-of-range input (non-positive quantity/price, missing customer, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The product's batches cannot cover the requested quantity.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The acting principal may not perform the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Every line of the order nets to zero quantity.
    #[error("order must contain at least one product with a quantity greater than zero")]
    EmptyOrder,

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness or concurrency conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Short machine-readable code, used for logs and HTTP bodies.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation_error",
            DomainError::InsufficientStock { .. } => "insufficient_stock",
            DomainError::PermissionDenied(_) => "permission_denied",
            DomainError::EmptyOrder => "empty_order",
            DomainError::NotFound(_) => "not_found",
            DomainError::Conflict(_) => "conflict",
            DomainError::InvariantViolation(_) => "invariant_violation",
        }
    }
}
