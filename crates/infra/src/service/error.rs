use thiserror::Error;

use wholesale_auth::AuthzError;
use wholesale_core::DomainError;

use crate::store::StoreError;

/// Terminal outcome of one back-office operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Deterministic business failure; surfaced to the caller verbatim.
    #[error(transparent)]
    Domain(DomainError),

    /// Persistence failure. Detail is logged; callers get a generic retry message.
    #[error("storage failure: {0}")]
    Storage(String),

    /// The order transaction ran past its time bound and was rolled back.
    #[error("order transaction timed out")]
    Timeout,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Domain(e) => e.code(),
            ServiceError::Storage(_) => "storage_error",
            ServiceError::Timeout => "timeout",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        ServiceError::Domain(value)
    }
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        ServiceError::Domain(value.into())
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Domain(e) => ServiceError::Domain(e),
            StoreError::Storage(msg) => {
                tracing::error!(error = %msg, "storage failure");
                ServiceError::Storage(msg)
            }
            StoreError::Timeout => {
                tracing::error!("transaction timed out");
                ServiceError::Timeout
            }
        }
    }
}
