//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP handlers, one file per area
//! - `dto.rs`: request bodies and their mapping onto service inputs
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use wholesale_infra::BackOffice;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(office: BackOffice) -> Router {
    // Protected routes: require a resolvable principal.
    let protected = routes::router()
        .layer(Extension(office.clone()))
        .layer(axum::middleware::from_fn_with_state(
            office,
            middleware::principal_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
