//! Front-end routing configuration.
//!
//! # Data Flow
//! ```text
//! ClientDefaults (compile-time defaults, env overrides)
//!     + page protocol + optional proxy URL
//!     → resolver.rs (decide Direct vs Proxied once)
//!     → Arc<ResolvedConfig> (immutable, shared)
//!     → api.rs (every call built through build_api_url)
//! ```

pub mod api;
pub mod resolver;

pub use api::ApiClient;
pub use resolver::{
    resolve, routing_mode, ClientDefaults, Diagnostic, PageProtocol, ResolvedConfig, RoutingMode,
};
