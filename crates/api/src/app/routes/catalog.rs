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
        .route("/products", get(list_products).post(create_product))
        .route("/categories", post(create_category))
}

pub async fn list_products(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    match office.visible_products(&principal).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    match office.create_product(&principal, body.into()).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CreateCategoryRequest>,
) -> axum::response::Response {
    match office.create_category(&principal, &body.name).await {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
