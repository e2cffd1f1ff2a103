//! Header manipulation.
//!
//! # Responsibilities
//! - Add permissive CORS headers to every response
//! - Strip hop-by-hop and body-describing headers before forwarding
//!
//! # Design Decisions
//! - CORS values are fixed: any origin, the common verbs, `Content-Type` and `Authorization`
//! - Preflight is answered by the handler itself; these layers only decorate responses

use axum::http::{header, HeaderMap, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Headers that never travel to the backend.
///
/// Hop-by-hop headers belong to the inbound connection. `host` and the body
/// descriptors are recomputed by the outbound client, and `accept-encoding` is
/// dropped because the relay decodes bodies itself.
const NOT_FORWARDED: [&str; 12] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
    "content-type",
    "accept-encoding",
];

/// Wrap a router so every response carries the CORS headers.
pub fn with_cors_headers(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
}

/// Copy the inbound headers that should be replayed against the backend.
pub fn forwardable_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in NOT_FORWARDED {
        headers.remove(name);
    }
    headers
}
