//! Transport-level errors mapped to HTTP responses.
//!
//! Failures reported by bus consumers are not errors here; the dispatcher
//! already turns them into 500 responses. This covers what happens before a
//! request reaches the dispatcher.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// The request used an HTTP method the route table cannot express.
    MethodNotAllowed(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MethodNotAllowed(method) => (
                StatusCode::METHOD_NOT_ALLOWED,
                format!("method {method} not allowed"),
            ),
        };

        tracing::debug!(status = status.as_u16(), %message, "request rejected");
        (status, Json(json!({ "error": message }))).into_response()
    }
}
