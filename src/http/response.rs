//! Outbound HTTP response conversion.
//!
//! # Responsibilities
//! - Turn a dispatch [`Response`] into an axum response
//! - Map dispatch failures to 500 Internal Server Error
//!
//! # Design Decisions
//! - Headers a controller set that are not valid HTTP are dropped with a
//!   warning rather than failing the response

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;

use crate::dispatch::Response;

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let (status, headers, body) = self.into_parts();
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = axum::response::Response::new(Body::from(body));
        *response.status_mut() = status;
        for (name, value) in headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().append(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping invalid response header"),
            }
        }
        response
    }
}

/// Response sent when a dispatch fails or its task panics.
///
/// Carries no detail; the dispatcher has already logged the failure.
pub fn internal_error() -> axum::response::Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
