//! HTTP-style route dispatch on top of the message bus.
//!
//! - `pattern` -- methods, static/parameterised/regex patterns, precedence tiers
//! - `dispatcher` -- `RouteDispatcher` route table, direct and bus targets

pub mod dispatcher;
pub mod pattern;

pub use dispatcher::{
    DirectHandler, ResponseStatus, RouteDispatcher, RouteInfo, RouteMatch, RouteResponse,
    RouteTarget,
};
pub use pattern::{Method, RoutePattern, RouteTier};
