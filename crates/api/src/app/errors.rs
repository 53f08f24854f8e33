use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use wholesale_core::DomainError;
use wholesale_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let code = err.code();
    match err {
        ServiceError::Domain(e) => {
            let status = match &e {
                DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                DomainError::InsufficientStock { .. } | DomainError::EmptyOrder => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                DomainError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                DomainError::Conflict(_) => StatusCode::CONFLICT,
                DomainError::InvariantViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            };
            json_error(status, code, e.to_string())
        }
        // Detail was already logged by the service.
        ServiceError::Storage(_) | ServiceError::Timeout => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            code,
            "the operation could not be completed, please try again",
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
