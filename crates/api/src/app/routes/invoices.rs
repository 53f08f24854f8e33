use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use wholesale_auth::Principal;
use wholesale_core::InvoiceId;
use wholesale_infra::BackOffice;

use crate::app::errors;
use crate::app::routes::common::parse_id;

pub fn router() -> Router {
    Router::new()
        .route("/:id", get(get_invoice))
        .route("/:id/paid", post(mark_paid))
}

pub async fn get_invoice(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let invoice_id: InvoiceId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match office.invoice(&principal, invoice_id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn mark_paid(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let invoice_id: InvoiceId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match office.mark_invoice_paid(&principal, invoice_id).await {
        Ok(changed) => (
            StatusCode::OK,
            Json(serde_json::json!({ "invoice_id": invoice_id, "changed": changed })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
