//! HTTPS-to-HTTP forwarding shim.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser (https page)                 api-proxy-shim                      Backend (http)
//!   ───────────────────                  ──────────────                      ──────────────
//!   GET /api/proxy?path=v1/data&x=1 ──▶  CORS · request ID · trace
//!                                        forward.rs: target = base + path
//!                                        body.rs:    none | json | multipart | raw
//!                                        reqwest ─────────────────────────▶  GET /v1/data?x=1
//!   ◀── status + JSON/text ────────────  response.rs ◀────────────────────  status + body
//! ```

use std::path::PathBuf;

use clap::Parser;

use api_proxy_shim::config::{self, validation::validate_config, ConfigError};
use api_proxy_shim::lifecycle::{signals, startup, Shutdown};
use api_proxy_shim::observability::logging;

#[derive(Parser)]
#[command(name = "api-proxy-shim", version)]
#[command(about = "Forward HTTPS front-end calls to a plain-HTTP backend", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the backend base URL.
    #[arg(long)]
    backend: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(backend) = cli.backend {
        config.backend.base_url = backend;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        backend = %config.backend.base_url,
        route = %config.proxy.route,
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    startup::run(config, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
