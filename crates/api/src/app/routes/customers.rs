use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use wholesale_auth::Principal;
use wholesale_core::CustomerId;
use wholesale_infra::BackOffice;

use crate::app::routes::common::parse_id;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route("/:id", get(get_customer))
}

pub async fn create_customer(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CreateCustomerRequest>,
) -> axum::response::Response {
    match office
        .create_customer(&principal, &body.name, body.phone.as_deref())
        .await
    {
        Ok(customer) => (StatusCode::CREATED, Json(customer)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_customers(Extension(office): Extension<BackOffice>) -> axum::response::Response {
    match office.customers().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_customer(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let customer_id: CustomerId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match office.customer_profile(&principal, customer_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
