//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (body size)
//!     → headers.rs (strip hop-by-hop before forwarding)
//! Outgoing response:
//!     → headers.rs (CORS headers on every response)
//! ```

pub mod headers;
pub mod limits;
