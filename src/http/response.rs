//! Canned responses.
//!
//! # Responsibilities
//! - Default "not found" answer when neither router matches
//! - Convert a caught handler panic into a 500 response
//!
//! # Design Decisions
//! - Panic payloads are logged, never echoed to the client

use std::any::Any;

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
    response::IntoResponse,
};

use crate::observability::metrics;

pub const NOT_FOUND_BODY: &str = "404 page not found";

/// Response used when no primary or alternate route matches.
pub fn not_found() -> axum::response::Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

/// Panic handler for the fault barrier.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "Handler panicked");
    metrics::record_panic();

    let mut response = Response::new(Body::from("Internal Server Error"));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_response_hides_payload() {
        let response = panic_response(Box::new("secret detail"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = panic_response(Box::new(42u8));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
    }
}
