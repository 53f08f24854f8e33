use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use wholesale_core::UserId;
use wholesale_infra::BackOffice;

/// Header carrying the authenticated user id, set by the fronting gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Resolve the acting [`wholesale_auth::Principal`] and attach it to the request.
///
/// Missing, malformed or unknown ids are rejected with 401 before any handler runs.
pub async fn principal_middleware(
    State(office): State<BackOffice>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let user_id = extract_user_id(req.headers())?;

    let principal = office
        .principal_for(user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "principal lookup failed");
            StatusCode::SERVICE_UNAVAILABLE
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn extract_user_id(headers: &HeaderMap) -> Result<UserId, StatusCode> {
    let raw = headers
        .get(USER_ID_HEADER)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?
        .trim();

    raw.parse::<UserId>().map_err(|_| StatusCode::UNAUTHORIZED)
}
