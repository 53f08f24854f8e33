use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use wholesale_auth::Principal;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": principal.user_id,
        "role": principal.role,
        "categories": principal.category_grants,
    }))
}
