//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use api_proxy_shim::{HttpServer, ShimConfig, Shutdown};

/// Bytes served by the backend's `/binary` endpoint; not valid UTF-8.
pub const BINARY_BODY: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff, 0x00, 0xfe];

/// A running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a backend that echoes what it received, with a few fixed endpoints:
/// - `/text`: 201, plain text
/// - `/missing`: 404, JSON
/// - `/broken-json`: 200, invalid JSON declared as JSON
/// - `/binary`: 200, [`BINARY_BODY`] as `image/png`
/// - `/slow`: answers after two seconds
pub async fn start_mock_backend() -> MockBackend {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().fallback(backend_handler).with_state(hits.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, hits }
}

async fn backend_handler(
    State(hits): State<Arc<AtomicUsize>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);

    match uri.path() {
        "/text" => (StatusCode::CREATED, "hello from backend").into_response(),
        "/missing" => (StatusCode::NOT_FOUND, Json(json!({ "detail": "not found" }))).into_response(),
        "/broken-json" => {
            ([(header::CONTENT_TYPE, "application/json")], "{oops").into_response()
        }
        "/binary" => ([(header::CONTENT_TYPE, "image/png")], BINARY_BODY).into_response(),
        "/slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "late": true })).into_response()
        }
        _ => {
            let header = |name: &str| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            Json(json!({
                "method": method.as_str(),
                "path": uri.path(),
                "query": uri.query(),
                "content_type": header("content-type"),
                "authorization": header("authorization"),
                "request_id": header("x-request-id"),
                "body": String::from_utf8_lossy(&body),
            }))
            .into_response()
        }
    }
}

/// A running shim instance.
pub struct TestShim {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestShim {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

/// Start the shim forwarding to `backend_base` on an ephemeral port.
pub async fn start_shim(backend_base: &str) -> TestShim {
    let mut config = ShimConfig::default();
    config.backend.base_url = backend_base.to_string();
    start_shim_with_config(config).await
}

/// Start the shim with an explicit configuration; the bind address is replaced.
pub async fn start_shim_with_config(mut config: ShimConfig) -> TestShim {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestShim { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
