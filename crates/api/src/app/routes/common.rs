use core::str::FromStr;

use axum::http::StatusCode;

use wholesale_core::DomainError;

use crate::app::errors;

/// Parse a typed id from a path segment, answering 400 on garbage.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, e.code(), e.to_string()))
}
