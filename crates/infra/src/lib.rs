//! Infrastructure layer: configuration, persistence and the back-office service.

pub mod config;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use service::{BackOffice, ServiceError, ServiceResult};
pub use store::{BackOfficeStore, InMemoryStore, PostgresStore, StoreError};
