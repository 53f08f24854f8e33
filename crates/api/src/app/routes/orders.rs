use axum::{
    Extension, Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use wholesale_auth::Principal;
use wholesale_infra::BackOffice;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order))
        .route("/mine", get(my_orders))
}

/// One submission, one invoice: every line commits or none does.
pub async fn create_order(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    match office.create_order(&principal, body.into()).await {
        Ok(invoice) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "invoice_id": invoice.invoice_id,
                "payment_status": invoice.payment_status,
                "due_date": invoice.due_date,
                "order_date": invoice.order_date,
                "grand_total": invoice.grand_total,
                "lines": invoice.lines,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn my_orders(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    match office.my_orders(&principal).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
