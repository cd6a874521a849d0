//! HTTP/1.1 response serialization.
//!
//! Emits a status line with the canonical reason phrase, headers in
//! insertion order, then the body bytes unmodified. Deterministic: the
//! same `Response` always serializes to the same bytes.

use portico_core::{Response, SerializationError};

/// Serialize a normalized [`Response`] into HTTP/1.1 wire bytes.
///
/// Appends a `Content-Length` header when the response does not carry
/// one. Fails only when the response is structurally invalid (status
/// outside 100-599).
pub fn write_response(resp: &Response) -> Result<Vec<u8>, SerializationError> {
    let status = resp.status();
    if !(100..=599).contains(&status) {
        return Err(SerializationError::StatusOutOfRange(status));
    }

    let reason = http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("");

    let mut out = Vec::with_capacity(resp.body().len() + 128);
    out.extend_from_slice(format!("HTTP/1.1 {status} {reason}\r\n").as_bytes());

    for (name, value) in resp.headers() {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    if resp.header("content-length").is_none() {
        out.extend_from_slice(format!("Content-Length: {}\r\n", resp.body().len()).as_bytes());
    }

    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(resp.body());
    Ok(out)
}
