//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → forward.rs (routing parameter, target URL, dispatch)
//!     → body.rs (inbound body → ForwardBody)
//!     → response.rs (backend body → JSON or text, status preserved)
//!     → error.rs (400 / 500 payloads)
//!     → Send to client
//! ```

pub mod body;
pub mod error;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use error::ProxyError;
pub use forward::{split_query, target_url, ROUTING_PARAM};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
