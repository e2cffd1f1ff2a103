//! Inbound body classification and outbound encoding.
//!
//! The inbound body is decided once, at the boundary, into a [`ForwardBody`]
//! and every later step matches on it exhaustively.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart},
    http::{header::CONTENT_TYPE, HeaderValue, Method, Request},
};
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde_json::{Map, Value};

use crate::http::error::ProxyError;
use crate::http::forward::ROUTING_PARAM;

/// Body to replay against the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardBody {
    /// Nothing is sent.
    None,
    /// Sent as `application/json`.
    Json(Value),
    /// Re-encoded as `multipart/form-data` with a fresh boundary.
    Multipart(Vec<MultipartField>),
    /// Sent byte-for-byte with the inbound content type.
    Raw {
        content_type: Option<HeaderValue>,
        bytes: Bytes,
    },
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartField {
    pub name: String,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        data: Bytes,
    },
}

/// Methods whose body is never forwarded.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

impl ForwardBody {
    /// Read and classify the body of an inbound request.
    pub async fn from_request(request: Request<Body>, limit: usize) -> Result<Self, ProxyError> {
        if !carries_body(request.method()) {
            return Ok(ForwardBody::None);
        }

        let content_type = request.headers().get(CONTENT_TYPE).cloned();
        if media_type(content_type.as_ref()).starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|rejection| ProxyError::Body(rejection.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        let bytes = axum::body::to_bytes(request.into_body(), limit)
            .await
            .map_err(|e| ProxyError::Body(e.to_string()))?;

        Ok(Self::classify(content_type, bytes))
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ProxyError> {
        let mut fields = Vec::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await?;

            let value = match file_name {
                Some(file_name) => FieldValue::File {
                    file_name,
                    content_type,
                    data,
                },
                None => FieldValue::Text(String::from_utf8_lossy(&data).into_owned()),
            };
            fields.push(MultipartField { name, value });
        }

        Ok(ForwardBody::Multipart(fields))
    }

    /// Classify an already-buffered, non-multipart body.
    pub fn classify(content_type: Option<HeaderValue>, bytes: Bytes) -> Self {
        if bytes.is_empty() {
            return ForwardBody::None;
        }

        if media_type(content_type.as_ref()).starts_with("application/x-www-form-urlencoded") {
            let object: Map<String, Value> = url::form_urlencoded::parse(&bytes)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            return ForwardBody::Json(strip_routing_field(Value::Object(object)));
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => ForwardBody::Json(strip_routing_field(value)),
            Err(_) => ForwardBody::Raw {
                content_type,
                bytes,
            },
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardBody::None => "none",
            ForwardBody::Json(_) => "json",
            ForwardBody::Multipart(_) => "multipart",
            ForwardBody::Raw { .. } => "raw",
        }
    }

    /// Attach this body to an outbound request.
    pub fn apply(self, builder: RequestBuilder) -> Result<RequestBuilder, ProxyError> {
        let builder = match self {
            ForwardBody::None => builder,
            ForwardBody::Json(value) => builder.json(&value),
            ForwardBody::Multipart(fields) => builder.multipart(build_form(fields)?),
            ForwardBody::Raw {
                content_type,
                bytes,
            } => match content_type {
                Some(ct) => builder.header(CONTENT_TYPE, ct).body(bytes),
                None => builder.body(bytes),
            },
        };
        Ok(builder)
    }
}

fn build_form(fields: Vec<MultipartField>) -> Result<Form, ProxyError> {
    let mut form = Form::new();
    for field in fields {
        form = match field.value {
            FieldValue::Text(text) => form.text(field.name, text),
            FieldValue::File {
                file_name,
                content_type,
                data,
            } => {
                let mut part = Part::bytes(data.to_vec()).file_name(file_name);
                if let Some(ct) = content_type {
                    part = part.mime_str(&ct)?;
                }
                form.part(field.name, part)
            }
        };
    }
    Ok(form)
}

/// Remove the routing parameter when a client duplicated it into a JSON object.
fn strip_routing_field(value: Value) -> Value {
    match value {
        Value::Object(mut object) => {
            object.remove(ROUTING_PARAM);
            Value::Object(object)
        }
        other => other,
    }
}

/// Lowercased media type without parameters; empty when absent.
fn media_type(content_type: Option<&HeaderValue>) -> String {
    content_type
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default()
}
