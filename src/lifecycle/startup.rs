//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order (metrics, HTTP server)
//! - Bind the listener, plain or TLS, and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ShimConfig;
use crate::http::{HttpServer, ServerError};
use crate::net::tls;
use crate::observability::metrics;

/// Start every subsystem and serve until `shutdown` fires.
pub async fn run(config: ShimConfig, shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let addr: SocketAddr = config
        .listener
        .bind_address
        .parse()
        .map_err(|_| ServerError::Address(config.listener.bind_address.clone()))?;
    let tls_config = config.listener.tls.clone();
    let server = HttpServer::new(config)?;

    match tls_config {
        Some(tls_config) => tls::serve_tls(server.router(), addr, &tls_config, shutdown).await,
        None => {
            let listener = TcpListener::bind(addr).await?;
            server.run(listener, shutdown).await
        }
    }
}
