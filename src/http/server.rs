//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the forwarding handler
//! - Wire up middleware (CORS headers, request ID, tracing, timeout, body limit)
//! - Build the outbound HTTP client
//! - Serve on a plain TCP listener with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ShimConfig;
use crate::http::forward::proxy_handler;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::security::{headers, limits};

/// Errors raised while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid address '{0}'")]
    Address(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub backend_base: Arc<str>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &ShimConfig) -> Result<Self, ServerError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("api-proxy-shim/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            backend_base: Arc::from(config.backend.base_url.as_str()),
            max_body_bytes: config.proxy.max_body_bytes,
        })
    }
}

/// HTTP server for the forwarding shim.
pub struct HttpServer {
    router: Router,
    config: ShimConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ShimConfig) -> Result<Self, ServerError> {
        let state = AppState::new(&config)?;
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ShimConfig, state: AppState) -> Router {
        let router = Router::new()
            .route(&config.proxy.route, any(proxy_handler))
            .with_state(state)
            .layer(limits::body_limit_layer(config.proxy.max_body_bytes))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id = %req.request_id(),
                    )
                }),
            )
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer());

        headers::with_cors_headers(router)
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until shutdown fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            route = %self.config.proxy.route,
            backend = %self.config.backend.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ShimConfig {
        &self.config
    }
}
