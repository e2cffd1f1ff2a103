//! Request size limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size for buffered and multipart bodies
//!
//! # Design Decisions
//! - One limit for every body shape, taken from `proxy.max_body_bytes`
//! - Oversized multipart bodies surface as a proxy failure from the handler

use axum::extract::DefaultBodyLimit;

/// Layer applying the body size limit to extractors.
pub fn body_limit_layer(max_body_bytes: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_body_bytes)
}
