//! HTTP layer for Switchyard.
//!
//! Axum router whose fallback feeds the route dispatcher, plus the error and
//! response adapters that turn dispatcher results into HTTP responses.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
