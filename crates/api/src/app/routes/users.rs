use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use wholesale_auth::Principal;
use wholesale_core::UserId;
use wholesale_infra::BackOffice;

use crate::app::routes::common::parse_id;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_team).post(create_user))
        .route("/:id", get(user_profile))
        .route("/:id/categories", put(update_categories))
}

pub async fn list_team(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    match office.team_users(&principal).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    let new_user = body.into_new_user(&principal);
    match office.create_user(&principal, new_user).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn user_profile(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id: UserId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match office.user_profile(&principal, user_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_categories(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCategoriesRequest>,
) -> axum::response::Response {
    let user_id: UserId = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match office
        .update_category_grants(&principal, user_id, body.categories)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
