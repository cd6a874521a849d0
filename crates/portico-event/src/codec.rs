//! JSON event decoding and encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use portico_core::{MalformedInvocationError, Request, Response, SerializationError};
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Inbound invocation event, serverless style.
///
/// Header values may be a single string or an array of strings; the
/// array form carries duplicate headers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpEvent {
    http_method: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    headers: Option<Map<String, Value>>,
    #[serde(default)]
    query_string_parameters: Option<Map<String, Value>>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    is_base64_encoded: bool,
}

/// Decode a JSON invocation event into a normalized [`Request`].
///
/// Fails with [`MalformedInvocationError::MissingMethod`] when the
/// event has no `httpMethod`, and with `BadEvent` when the document is
/// not valid JSON or carries values of the wrong shape.
pub fn from_event(raw: &[u8]) -> Result<Request, MalformedInvocationError> {
    if raw.is_empty() {
        return Err(MalformedInvocationError::Empty);
    }

    let event: HttpEvent = serde_json::from_slice(raw)
        .map_err(|e| MalformedInvocationError::BadEvent(e.to_string()))?;

    let method = event
        .http_method
        .filter(|m| !m.is_empty())
        .ok_or(MalformedInvocationError::MissingMethod)?;

    let mut builder = Request::builder()
        .method(method)
        .path(event.path.unwrap_or_else(|| "/".to_string()));

    if let Some(headers) = event.headers {
        for (name, value) in headers {
            match value {
                Value::String(v) => builder = builder.header(&name, v),
                Value::Array(values) => {
                    for v in values {
                        match v {
                            Value::String(v) => builder = builder.header(&name, v),
                            other => {
                                return Err(MalformedInvocationError::BadEvent(format!(
                                    "header {name} has non-string value {other}"
                                )));
                            }
                        }
                    }
                }
                other => {
                    return Err(MalformedInvocationError::BadEvent(format!(
                        "header {name} has non-string value {other}"
                    )));
                }
            }
        }
    }

    if let Some(params) = event.query_string_parameters {
        for (key, value) in params {
            match value {
                Value::String(v) => builder = builder.query_param(key, v),
                other => {
                    return Err(MalformedInvocationError::BadEvent(format!(
                        "query parameter {key} has non-string value {other}"
                    )));
                }
            }
        }
    }

    let body = match event.body {
        None => Bytes::new(),
        Some(text) if event.is_base64_encoded => Bytes::from(
            BASE64
                .decode(text.as_bytes())
                .map_err(|e| MalformedInvocationError::BadEvent(format!("bad base64 body: {e}")))?,
        ),
        Some(text) => Bytes::from(text),
    };

    Ok(builder.body(body).build())
}

/// Encode a normalized [`Response`] as the platform result document.
///
/// UTF-8 bodies travel as plain strings; anything else is base64 with
/// `isBase64Encoded` set. Headers keep their insertion order; when the
/// same name was set twice the last value wins (the document's header
/// field is a flat object).
pub fn to_event(resp: &Response) -> Result<Value, SerializationError> {
    let status = resp.status();
    if !(100..=599).contains(&status) {
        return Err(SerializationError::StatusOutOfRange(status));
    }

    let mut headers = Map::new();
    for (name, value) in resp.headers() {
        headers.insert(name.clone(), Value::String(value.clone()));
    }

    let (body, is_base64) = match std::str::from_utf8(resp.body()) {
        Ok(text) => (text.to_string(), false),
        Err(_) => (BASE64.encode(resp.body()), true),
    };

    Ok(json!({
        "statusCode": status,
        "headers": Value::Object(headers),
        "body": body,
        "isBase64Encoded": is_base64,
    }))
}
