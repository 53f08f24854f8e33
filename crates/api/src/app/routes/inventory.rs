use axum::{Extension, Json, Router, http::StatusCode, response::IntoResponse, routing::post};

use wholesale_auth::Principal;
use wholesale_infra::BackOffice;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/receipts", post(receive_stock))
}

pub async fn receive_stock(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::ReceiveStockRequest>,
) -> axum::response::Response {
    match office
        .receive_stock(&principal, body.product_id, body.receipt.into())
        .await
    {
        Ok(batch_id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "batch_id": batch_id })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
