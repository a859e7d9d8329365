//! Route dispatcher: maps `(method, path)` to a direct handler or a bus
//! exchange and turns the result into a status plus JSON body.
//!
//! Precedence is static > parameterised > regex, then registration order
//! within a tier. First match wins.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use switchyard_types::address::Address;
use switchyard_types::body::Body;
use switchyard_types::error::{BusError, RouteError};
use tracing::{debug, warn};

use super::pattern::{Method, RoutePattern, RouteTier};
use crate::message::MessageBus;

/// A matched request: its path and the parameters the pattern extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

pub type DirectHandler = Arc<dyn Fn(&RouteMatch) -> Body + Send + Sync>;

/// Where a matched request goes.
#[derive(Clone)]
pub enum RouteTarget {
    /// Answered in place with 200.
    Direct(DirectHandler),
    /// Forwarded over the bus with `send_with_reply`.
    Bus(Address),
}

impl RouteTarget {
    pub fn direct<F>(handler: F) -> Self
    where
        F: Fn(&RouteMatch) -> Body + Send + Sync + 'static,
    {
        Self::Direct(Arc::new(handler))
    }

    pub fn bus(address: Address) -> Self {
        Self::Bus(address)
    }
}

impl fmt::Debug for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Direct"),
            Self::Bus(address) => f.debug_tuple("Bus").field(address).finish(),
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("direct"),
            Self::Bus(address) => write!(f, "bus -> {address}"),
        }
    }
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    pattern: RoutePattern,
    target: RouteTarget,
}

/// Listing entry for one registered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub method: Method,
    pub tier: RouteTier,
    pub pattern: String,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    NotFound,
    ServerError,
}

impl ResponseStatus {
    pub fn code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
            Self::ServerError => 500,
        }
    }
}

/// Transport-neutral response produced by [`RouteDispatcher::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    pub status: ResponseStatus,
    pub body: Value,
}

impl RouteResponse {
    fn ok(body: Body) -> Self {
        Self {
            status: ResponseStatus::Ok,
            body: body.into(),
        }
    }

    fn error(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

/// Ordered route table bound to a message bus.
pub struct RouteDispatcher {
    bus: Arc<MessageBus>,
    routes: Vec<Route>,
}

impl RouteDispatcher {
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            bus,
            routes: Vec::new(),
        }
    }

    /// Register a static or `:name` parameterised route.
    pub fn route(
        &mut self,
        method: Method,
        template: &str,
        target: RouteTarget,
    ) -> Result<&mut Self, RouteError> {
        let pattern = RoutePattern::template(template)?;
        Ok(self.push(method, pattern, target))
    }

    /// Register a regex route. Capture groups become `param0`, `param1`, ...
    pub fn route_regex(
        &mut self,
        method: Method,
        pattern: &str,
        target: RouteTarget,
    ) -> Result<&mut Self, RouteError> {
        let pattern = RoutePattern::regex(pattern)?;
        Ok(self.push(method, pattern, target))
    }

    fn push(&mut self, method: Method, pattern: RoutePattern, target: RouteTarget) -> &mut Self {
        debug!(%method, %pattern, tier = %pattern.tier(), %target, "registered route");
        self.routes.push(Route {
            method,
            pattern,
            target,
        });
        self
    }

    /// Find the winning route for `method` and `path`.
    fn resolve(&self, method: Method, path: &str) -> Option<(&Route, RouteMatch)> {
        RouteTier::ALL.iter().find_map(|tier| {
            self.routes
                .iter()
                .filter(|route| route.method == method && route.pattern.tier() == *tier)
                .find_map(|route| {
                    route.pattern.matches(path).map(|params| {
                        (
                            route,
                            RouteMatch {
                                path: path.to_string(),
                                params,
                            },
                        )
                    })
                })
        })
    }

    /// Dispatch a request and map its result to a response.
    ///
    /// Bus failures, including "no consumer registered", become 500 with
    /// `{"error": message}`.
    pub async fn dispatch(&self, method: Method, path: &str) -> RouteResponse {
        let Some((route, matched)) = self.resolve(method, path) else {
            debug!(%method, path, "no route");
            return RouteResponse::error(
                ResponseStatus::NotFound,
                format!("no route for {method} {path}"),
            );
        };

        match &route.target {
            RouteTarget::Direct(handler) => {
                debug!(%method, path, pattern = %route.pattern, "direct route");
                RouteResponse::ok(handler(&matched))
            }
            RouteTarget::Bus(address) => {
                let mut body = Body::new();
                for (name, value) in &matched.params {
                    body.insert(name.clone(), value.clone());
                }
                body.insert("path", matched.path.clone());

                let handle = self.bus.send_with_reply(address, body);
                let correlation = handle.correlation();
                debug!(%method, path, %address, correlation_id = %correlation, "forwarded to bus");

                match handle.await.into_result() {
                    Ok(body) => RouteResponse::ok(body),
                    Err(err) => {
                        match &err {
                            BusError::NoHandlerRegistered { .. } => {
                                warn!(%address, correlation_id = %correlation, "no consumer for routed request")
                            }
                            BusError::ConsumerReportedFailure { code, .. } => {
                                warn!(%address, correlation_id = %correlation, code, error = %err, "bus request failed")
                            }
                        }
                        RouteResponse::error(ResponseStatus::ServerError, err.message())
                    }
                }
            }
        }
    }

    /// Registered routes in precedence order.
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut infos: Vec<RouteInfo> = self
            .routes
            .iter()
            .map(|route| RouteInfo {
                method: route.method,
                tier: route.pattern.tier(),
                pattern: route.pattern.to_string(),
                target: route.target.to_string(),
            })
            .collect();
        // Stable sort keeps registration order within a tier.
        infos.sort_by_key(|info| info.tier);
        infos
    }

    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }
}

impl fmt::Debug for RouteDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDispatcher")
            .field("routes", &self.routes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::message::{Message, consumer_fn};
    use switchyard_types::message::Outcome;

    fn event_address() -> Address {
        Address::new("event.verticle").unwrap()
    }

    fn make_dispatcher() -> RouteDispatcher {
        let bus = Arc::new(MessageBus::new(Diagnostics::new()));
        let mut dispatcher = RouteDispatcher::new(bus);
        dispatcher
            .route(Method::Get, "/", RouteTarget::bus(event_address()))
            .unwrap()
            .route(
                Method::Get,
                "/customer/:id",
                RouteTarget::direct(|m: &RouteMatch| {
                    Body::new()
                        .with("ok", false)
                        .with("custID", m.param("id").unwrap_or_default())
                }),
            )
            .unwrap()
            .route(
                Method::Get,
                "/customer/:id/address/:index",
                RouteTarget::direct(|m: &RouteMatch| {
                    Body::new()
                        .with("ok", false)
                        .with("custID", m.param("id").unwrap_or_default())
                        .with("addrIndex", m.param("index").unwrap_or_default())
                }),
            )
            .unwrap()
            .route_regex(
                Method::Get,
                r"^/product/(\d+)",
                RouteTarget::direct(|m: &RouteMatch| {
                    Body::new()
                        .with("ok", false)
                        .with("product", m.param("param0").unwrap_or_default())
                }),
            )
            .unwrap();
        dispatcher
    }

    fn echo(message: Message) -> impl std::future::Future<Output = Option<Outcome>> {
        async move { Some(Outcome::Success(message.body().clone())) }
    }

    #[tokio::test]
    async fn customer_route_answers_directly() {
        let dispatcher = make_dispatcher();
        let response = dispatcher.dispatch(Method::Get, "/customer/42").await;
        assert_eq!(response.status, ResponseStatus::Ok);
        assert_eq!(response.body, json!({"ok": false, "custID": "42"}));
    }

    #[tokio::test]
    async fn customer_address_route_answers_directly() {
        let dispatcher = make_dispatcher();
        let response = dispatcher.dispatch(Method::Get, "/customer/42/address/1").await;
        assert_eq!(response.status, ResponseStatus::Ok);
        assert_eq!(
            response.body,
            json!({"ok": false, "custID": "42", "addrIndex": "1"})
        );
    }

    #[tokio::test]
    async fn product_regex_route_answers_directly() {
        let dispatcher = make_dispatcher();
        let response = dispatcher.dispatch(Method::Get, "/product/77").await;
        assert_eq!(response.status, ResponseStatus::Ok);
        assert_eq!(response.body, json!({"ok": false, "product": "77"}));
    }

    #[tokio::test]
    async fn root_route_without_consumer_is_server_error() {
        let dispatcher = make_dispatcher();
        let response = dispatcher.dispatch(Method::Get, "/").await;
        assert_eq!(response.status, ResponseStatus::ServerError);
        assert_eq!(response.body, json!({"error": "no consumer registered"}));
    }

    #[tokio::test]
    async fn root_route_with_failing_consumer_is_server_error() {
        let dispatcher = make_dispatcher();
        dispatcher.bus().register(
            event_address(),
            consumer_fn(|_message: Message| async move {
                Some(Outcome::failure(1, "Random Failure"))
            }),
        );

        let response = dispatcher.dispatch(Method::Get, "/").await;
        assert_eq!(response.status.code(), 500);
        assert_eq!(response.body, json!({"error": "Random Failure"}));
    }

    #[tokio::test]
    async fn root_route_with_panicking_consumer_is_server_error() {
        let dispatcher = make_dispatcher();
        dispatcher.bus().register(
            event_address(),
            consumer_fn(|message: Message| async move {
                if message.body().get_str("path") == Some("/") {
                    panic!("root not supported");
                }
                None::<Outcome>
            }),
        );

        let response = dispatcher.dispatch(Method::Get, "/").await;
        assert_eq!(response.status.code(), 500);
        assert_eq!(response.body, json!({"error": "consumer panicked"}));
    }

    #[tokio::test]
    async fn root_route_with_echo_consumer_returns_body() {
        let dispatcher = make_dispatcher();
        dispatcher.bus().register(event_address(), consumer_fn(echo));

        let response = dispatcher.dispatch(Method::Get, "/").await;
        assert_eq!(response.status.code(), 200);
        assert_eq!(response.body, json!({"path": "/"}));
    }

    #[tokio::test]
    async fn bus_body_carries_params_and_request_path() {
        let bus = Arc::new(MessageBus::new(Diagnostics::new()));
        let address = Address::new("orders").unwrap();
        bus.register(address.clone(), consumer_fn(echo));

        let mut dispatcher = RouteDispatcher::new(bus);
        dispatcher
            .route(Method::Get, "/orders/:id/:path", RouteTarget::bus(address))
            .unwrap();

        let response = dispatcher.dispatch(Method::Get, "/orders/9/x").await;
        assert_eq!(response.body, json!({"id": "9", "path": "/orders/9/x"}));
    }

    #[tokio::test]
    async fn unmatched_request_is_not_found() {
        let dispatcher = make_dispatcher();
        let response = dispatcher.dispatch(Method::Get, "/nope").await;
        assert_eq!(response.status.code(), 404);
        assert_eq!(response.body, json!({"error": "no route for GET /nope"}));

        let response = dispatcher.dispatch(Method::Post, "/customer/42").await;
        assert_eq!(response.status, ResponseStatus::NotFound);
        assert_eq!(response.body, json!({"error": "no route for POST /customer/42"}));
    }

    #[tokio::test]
    async fn trailing_slash_is_ignored() {
        let dispatcher = make_dispatcher();
        let response = dispatcher.dispatch(Method::Get, "/customer/42/").await;
        assert_eq!(response.body, json!({"ok": false, "custID": "42"}));
    }

    #[tokio::test]
    async fn static_beats_params_beats_regex() {
        let bus = Arc::new(MessageBus::new(Diagnostics::new()));
        let mut dispatcher = RouteDispatcher::new(bus);
        let tagged = |tag: &'static str| RouteTarget::direct(move |_: &RouteMatch| Body::new().with("route", tag));

        // Registered in reverse precedence order on purpose.
        dispatcher
            .route_regex(Method::Get, r"/items/(.+)", tagged("regex"))
            .unwrap()
            .route(Method::Get, "/items/:id", tagged("params"))
            .unwrap()
            .route(Method::Get, "/items/special", tagged("static"))
            .unwrap();

        let route_of = |response: RouteResponse| response.body["route"].clone();
        assert_eq!(route_of(dispatcher.dispatch(Method::Get, "/items/special").await), "static");
        assert_eq!(route_of(dispatcher.dispatch(Method::Get, "/items/5").await), "params");
        assert_eq!(route_of(dispatcher.dispatch(Method::Get, "/items/5/x").await), "regex");
    }

    #[tokio::test]
    async fn first_registration_wins_within_a_tier() {
        let bus = Arc::new(MessageBus::new(Diagnostics::new()));
        let mut dispatcher = RouteDispatcher::new(bus);
        dispatcher
            .route(Method::Get, "/a/:x", RouteTarget::direct(|_: &RouteMatch| Body::new().with("n", 1)))
            .unwrap()
            .route(Method::Get, "/a/:y", RouteTarget::direct(|_: &RouteMatch| Body::new().with("n", 2)))
            .unwrap();

        let response = dispatcher.dispatch(Method::Get, "/a/b").await;
        assert_eq!(response.body, json!({"n": 1}));
    }

    #[test]
    fn invalid_routes_are_rejected() {
        let bus = Arc::new(MessageBus::new(Diagnostics::new()));
        let mut dispatcher = RouteDispatcher::new(bus);
        assert!(matches!(
            dispatcher.route_regex(Method::Get, "(", RouteTarget::bus(event_address())),
            Err(RouteError::InvalidRegex { .. })
        ));
        assert!(matches!(
            dispatcher.route(Method::Get, "/a/:id/:id", RouteTarget::bus(event_address())),
            Err(RouteError::DuplicateParam { .. })
        ));
        assert!(dispatcher.routes().is_empty());
    }

    #[test]
    fn routes_are_listed_in_precedence_order() {
        let dispatcher = make_dispatcher();
        let listed: Vec<(RouteTier, String, String)> = dispatcher
            .routes()
            .into_iter()
            .map(|info| (info.tier, info.pattern, info.target))
            .collect();

        assert_eq!(
            listed,
            vec![
                (RouteTier::Static, "/".to_string(), "bus -> event.verticle".to_string()),
                (RouteTier::Params, "/customer/:id".to_string(), "direct".to_string()),
                (
                    RouteTier::Params,
                    "/customer/:id/address/:index".to_string(),
                    "direct".to_string()
                ),
                (RouteTier::Regex, r"^/product/(\d+)".to_string(), "direct".to_string()),
            ]
        );
    }
}
