//! Forwarding failures and their HTTP representation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned when the routing parameter is absent.
pub const MISSING_PATH_MESSAGE: &str = "Missing path parameter. Use ?path=api/v1/...";

/// Errors produced while forwarding a single request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The `path` query parameter was missing or empty.
    #[error("{}", MISSING_PATH_MESSAGE)]
    MissingPath,

    /// Base URL and routing parameter did not form a valid URL.
    #[error("invalid target URL '{url}': {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The inbound body could not be read.
    #[error("failed to read request body: {0}")]
    Body(String),

    /// The inbound multipart body could not be parsed.
    #[error("failed to read multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// The backend declared a JSON body that does not parse.
    #[error("invalid JSON from backend: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Building or sending the outbound request, or reading its response, failed.
    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

impl ProxyError {
    /// Status code the caller receives for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingPath => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ProxyError::MissingPath => json!({ "error": MISSING_PATH_MESSAGE }),
            other => json!({
                "error": "Proxy error",
                "message": other.to_string(),
                "details": "Failed to connect to API server",
            }),
        };
        (status, Json(body)).into_response()
    }
}
