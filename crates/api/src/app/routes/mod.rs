use axum::{Router, routing::get};

pub mod catalog;
pub mod common;
pub mod customers;
pub mod inventory;
pub mod invoices;
pub mod orders;
pub mod reports;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(catalog::router())
        .nest("/inventory", inventory::router())
        .nest("/customers", customers::router())
        .nest("/orders", orders::router())
        .nest("/invoices", invoices::router())
        .nest("/reports", reports::router())
        .nest("/users", users::router())
}
