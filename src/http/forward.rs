//! The forwarding handler.
//!
//! # Data Flow
//! ```text
//! inbound request (?path=api/v1/...&other=params)
//!     → OPTIONS short-circuit (200, empty)
//!     → split_query (routing parameter vs. passthrough segments)
//!     → target_url (backend base + routing parameter + passthrough)
//!     → body.rs (classify body once)
//!     → reqwest dispatch (same method, filtered headers)
//!     → response.rs (relay JSON or text, original status)
//! ```

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::http::body::ForwardBody;
use crate::http::error::ProxyError;
use crate::http::request::RequestIdExt;
use crate::http::response::RelayedResponse;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::headers::forwardable_headers;

/// Query parameter naming the backend-relative path to invoke.
pub const ROUTING_PARAM: &str = "path";

/// Inbound query string split around the routing parameter.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RoutedQuery {
    /// Decoded value of the first routing parameter, if any.
    pub path: Option<String>,
    /// Every other segment, verbatim and in order.
    pub passthrough: Vec<String>,
}

/// Split a raw query string into the routing parameter and the segments to pass on.
pub fn split_query(query: Option<&str>) -> RoutedQuery {
    let mut routed = RoutedQuery::default();

    for segment in query.unwrap_or_default().split('&').filter(|s| !s.is_empty()) {
        let decoded = url::form_urlencoded::parse(segment.as_bytes()).next();
        match decoded {
            Some((key, value)) if key == ROUTING_PARAM => {
                if routed.path.is_none() {
                    routed.path = Some(value.into_owned());
                }
            }
            _ => routed.passthrough.push(segment.to_string()),
        }
    }

    routed
}

/// Join the backend base and a relative path, then append passthrough segments.
///
/// One trailing `/` is dropped from `base` and one leading `/` from `path`.
/// A `#` in `path` stays part of the path: it is re-encoded so it cannot start
/// a fragment that would swallow the passthrough segments.
pub fn target_url(base: &str, path: &str, passthrough: &[String]) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    let path = path.strip_prefix('/').unwrap_or(path).replace('#', "%23");

    let mut target = format!("{}/{}", base, path);
    if !passthrough.is_empty() {
        target.push(if target.contains('?') { '&' } else { '?' });
        target.push_str(&passthrough.join("&"));
    }
    target
}

/// Forward one inbound request to the backend and relay its answer.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request.request_id().to_string();

    match forward(&state, request, &request_id).await {
        Ok(relayed) => {
            metrics::record_request(method.as_str(), relayed.status.as_u16(), start_time);
            relayed.into_response()
        }
        Err(err) => {
            match &err {
                ProxyError::MissingPath => {
                    tracing::warn!(request_id = %request_id, "Rejected request without routing parameter");
                }
                other => {
                    tracing::error!(request_id = %request_id, method = %method, error = %other, "Proxy error");
                }
            }
            metrics::record_request(method.as_str(), err.status().as_u16(), start_time);
            err.into_response()
        }
    }
}

async fn forward(
    state: &AppState,
    request: Request<Body>,
    request_id: &str,
) -> Result<RelayedResponse, ProxyError> {
    let routed = split_query(request.uri().query());
    let path = routed
        .path
        .filter(|p| !p.is_empty())
        .ok_or(ProxyError::MissingPath)?;

    let target = target_url(&state.backend_base, &path, &routed.passthrough);
    let url = Url::parse(&target).map_err(|source| ProxyError::InvalidTarget {
        url: target.clone(),
        source,
    })?;

    let method = request.method().clone();
    let headers = forwardable_headers(request.headers());
    let body = ForwardBody::from_request(request, state.max_body_bytes).await?;

    tracing::info!(
        request_id = %request_id,
        method = %method,
        target = %url,
        body = body.kind(),
        "Proxying request"
    );

    let outbound = body.apply(state.client.request(method, url).headers(headers))?;
    let response = outbound.send().await?;

    let relayed = RelayedResponse::from_upstream(response).await?;
    tracing::debug!(request_id = %request_id, status = %relayed.status, "Backend responded");
    Ok(relayed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_query_extracts_routing_param() {
        let routed = split_query(Some("path=api%2Fv1%2Fdata&limit=10&sort=desc"));
        assert_eq!(routed.path.as_deref(), Some("api/v1/data"));
        assert_eq!(routed.passthrough, vec!["limit=10", "sort=desc"]);
    }

    #[test]
    fn test_split_query_keeps_segments_verbatim_and_ordered() {
        let routed = split_query(Some("z=1&path=x&q=hello%20world&a=%2B&flag"));
        assert_eq!(routed.passthrough, vec!["z=1", "q=hello%20world", "a=%2B", "flag"]);
    }

    #[test]
    fn test_split_query_missing_or_empty() {
        assert_eq!(split_query(None).path, None);
        assert_eq!(split_query(Some("a=1")).path, None);
        assert_eq!(split_query(Some("path=")).path.as_deref(), Some(""));
    }

    #[test]
    fn test_split_query_first_routing_param_wins() {
        let routed = split_query(Some("path=first&path=second&x=1"));
        assert_eq!(routed.path.as_deref(), Some("first"));
        assert_eq!(routed.passthrough, vec!["x=1"]);
    }

    #[test]
    fn test_target_url_normalizes_separators() {
        let cases = [
            ("http://host/", "/api/v1/data"),
            ("http://host/", "api/v1/data"),
            ("http://host", "/api/v1/data"),
            ("http://host", "api/v1/data"),
        ];
        for (base, path) in cases {
            assert_eq!(target_url(base, path, &[]), "http://host/api/v1/data");
        }
    }

    #[test]
    fn test_target_url_appends_passthrough() {
        let passthrough = vec!["limit=10".to_string(), "q=a%20b".to_string()];
        assert_eq!(
            target_url("http://host/", "items", &passthrough),
            "http://host/items?limit=10&q=a%20b"
        );
        assert_eq!(
            target_url("http://host/", "items?page=2", &passthrough),
            "http://host/items?page=2&limit=10&q=a%20b"
        );
    }

    #[test]
    fn test_target_url_keeps_hash_in_path() {
        let routed = split_query(Some("path=notes%23intro&limit=5"));
        let target = target_url("http://host/", routed.path.as_deref().unwrap(), &routed.passthrough);
        assert_eq!(target, "http://host/notes%23intro?limit=5");

        let url = Url::parse(&target).unwrap();
        assert_eq!(url.path(), "/notes%23intro");
        assert_eq!(url.query(), Some("limit=5"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_target_url_with_base_path() {
        assert_eq!(
            target_url("http://host/backend/", "/v1/data", &[]),
            "http://host/backend/v1/data"
        );
    }
}
