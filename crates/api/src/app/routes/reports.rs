use axum::{Extension, Json, Router, extract::Path, http::StatusCode, response::IntoResponse, routing::get};

use wholesale_auth::Principal;
use wholesale_core::UserId;
use wholesale_infra::BackOffice;

use crate::app::errors;
use crate::app::routes::common::parse_id;

pub fn router() -> Router {
    Router::new()
        .route("/team/:user_id", get(team_report))
        .route("/team-invoices", get(team_invoices))
        .route("/due/:user_id", get(due_summary))
}

pub async fn team_report(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
) -> axum::response::Response {
    let view_user: UserId = match parse_id(&user_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match office.team_report(&principal, view_user).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn team_invoices(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    match office.team_invoices(&principal).await {
        Ok(teams) => (StatusCode::OK, Json(teams)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn due_summary(
    Extension(office): Extension<BackOffice>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
) -> axum::response::Response {
    let view_user: UserId = match parse_id(&user_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match office.due_summary(&principal, view_user).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
