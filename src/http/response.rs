//! Backend response relay.
//!
//! # Responsibilities
//! - Decode the backend body as JSON, or pass any other body through byte for byte
//! - Preserve the backend status code
//!
//! # Design Decisions
//! - Bodies are buffered; the relay re-serialises JSON rather than streaming
//! - Backend headers other than `Content-Type` are not relayed

use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::http::error::ProxyError;

/// Fallback content type for non-JSON bodies without one.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// A decoded backend response ready to be sent to the caller.
#[derive(Debug)]
pub struct RelayedResponse {
    pub status: StatusCode,
    pub body: RelayedBody,
}

#[derive(Debug, PartialEq)]
pub enum RelayedBody {
    Json(Value),
    /// Anything that is not JSON, relayed unchanged.
    Text {
        content_type: Option<HeaderValue>,
        bytes: Bytes,
    },
}

impl RelayedResponse {
    /// Read the whole backend response.
    pub async fn from_upstream(response: reqwest::Response) -> Result<Self, ProxyError> {
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let bytes = response.bytes().await?;

        Ok(Self {
            status,
            body: RelayedBody::decode(content_type, bytes)?,
        })
    }
}

impl RelayedBody {
    /// Decode a buffered body. An empty JSON body is relayed as empty text.
    pub fn decode(content_type: Option<HeaderValue>, bytes: Bytes) -> Result<Self, ProxyError> {
        let is_json = content_type
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        if is_json && !bytes.is_empty() {
            return Ok(RelayedBody::Json(serde_json::from_slice(&bytes)?));
        }

        Ok(RelayedBody::Text {
            content_type,
            bytes,
        })
    }
}

impl IntoResponse for RelayedResponse {
    fn into_response(self) -> Response {
        match self.body {
            RelayedBody::Json(value) => (self.status, Json(value)).into_response(),
            RelayedBody::Text {
                content_type,
                bytes,
            } => {
                let content_type =
                    content_type.unwrap_or_else(|| HeaderValue::from_static(TEXT_PLAIN));
                (self.status, [(CONTENT_TYPE, content_type)], bytes).into_response()
            }
        }
    }
}
