//! Direct handlers for the customer and product routes.

use switchyard_core::route::RouteMatch;
use switchyard_types::body::Body;

/// `GET /customer/:id`
pub fn customer(matched: &RouteMatch) -> Body {
    Body::new()
        .with("ok", false)
        .with("custID", matched.param("id").unwrap_or_default())
}

/// `GET /customer/:id/address/:index`
pub fn customer_address(matched: &RouteMatch) -> Body {
    customer(matched).with("addrIndex", matched.param("index").unwrap_or_default())
}

/// `GET ^/product/(\d+)`
pub fn product(matched: &RouteMatch) -> Body {
    Body::new()
        .with("ok", false)
        .with("product", matched.param("param0").unwrap_or_default())
}
