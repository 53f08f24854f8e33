//! `wholesale-auth`: pure authorization boundary.
//!
//! The authenticated principal is an explicit value passed into every core
//! call; nothing here reads ambient session state. Decoupled from HTTP and
//! storage.

pub mod authorize;
pub mod grants;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, authorize, authorize_role_creation};
pub use grants::CategoryAccessGate;
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
