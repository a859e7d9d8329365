//! HTTP handlers and the route table served by `syard serve`.
//!
//! Axum owns only `/health`; every other request falls through to
//! [`dispatch`], which hands it to the [`RouteDispatcher`].

pub mod catalog;
pub mod health;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method as HttpMethod, Uri};
use switchyard_core::message::MessageBus;
use switchyard_core::route::{Method, RouteDispatcher, RouteTarget};
use switchyard_types::address::Address;
use switchyard_types::error::RouteError;

use crate::http::error::AppError;
use crate::http::response::HttpReply;
use crate::state::AppState;

/// Build the route table: the root route goes over the bus to
/// `event_address`, the catalog routes answer directly.
pub fn build_dispatcher(
    bus: Arc<MessageBus>,
    event_address: Address,
) -> Result<RouteDispatcher, RouteError> {
    let mut dispatcher = RouteDispatcher::new(bus);
    dispatcher
        .route(Method::Get, "/", RouteTarget::bus(event_address))?
        .route(Method::Get, "/customer/:id", RouteTarget::direct(catalog::customer))?
        .route(
            Method::Get,
            "/customer/:id/address/:index",
            RouteTarget::direct(catalog::customer_address),
        )?
        .route_regex(Method::Get, r"^/product/(\d+)", RouteTarget::direct(catalog::product))?;
    Ok(dispatcher)
}

/// Fallback handler: dispatch any request axum did not route itself.
pub async fn dispatch(
    State(state): State<AppState>,
    method: HttpMethod,
    uri: Uri,
) -> Result<HttpReply, AppError> {
    let method: Method = method
        .as_str()
        .parse()
        .map_err(|_| AppError::MethodNotAllowed(method.to_string()))?;

    let response = state.dispatcher.dispatch(method, uri.path()).await;
    Ok(HttpReply(response))
}
