//! HTTPS-to-HTTP forwarding shim.
//!
//! Lets a front-end served over HTTPS reach a plain-HTTP backend without
//! mixed-content blocking. Two halves share only a URL contract:
//!
//! - [`http`]: the forwarding handler, which replays `?path=...` requests
//!   against a fixed backend and relays the answer.
//! - [`client`]: the routing resolver, which decides once whether API calls go
//!   direct or through the shim, and builds every API URL accordingly.

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use client::{resolve, ApiClient, ResolvedConfig, RoutingMode};
pub use config::ShimConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
