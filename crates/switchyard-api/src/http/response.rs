//! Dispatcher results as HTTP responses.
//!
//! The body is the dispatcher's JSON as-is: the reply body on success,
//! `{"error": message}` otherwise.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use switchyard_core::route::RouteResponse;

pub struct HttpReply(pub RouteResponse);

impl IntoResponse for HttpReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status.code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.body)).into_response()
    }
}
