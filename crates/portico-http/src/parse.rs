//! HTTP/1.1 request parsing.
//!
//! Parses a request head (request line + headers) and body out of raw
//! bytes. Normalization rules: method uppercased, query string decoded
//! with last-value-wins on duplicate keys, header order preserved as
//! received. Tolerates bare-LF line endings alongside CRLF.

use bytes::Bytes;
use portico_core::{MalformedInvocationError, Request};

/// Parse raw HTTP/1.1 request bytes into a normalized [`Request`].
///
/// Fails with [`MalformedInvocationError`] when the head cannot be
/// parsed into method + path + headers; never panics on any input.
pub fn parse_request(raw: &[u8]) -> Result<Request, MalformedInvocationError> {
    if raw.is_empty() {
        return Err(MalformedInvocationError::Empty);
    }

    let (head, body) = split_head(raw);
    let head = String::from_utf8_lossy(head);
    let mut lines = head.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    let request_line = lines.next().unwrap_or("");
    let (method, target) = parse_request_line(request_line)?;

    let (path, query_str) = match target.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (target, None),
    };

    let mut builder = Request::builder().method(method).path(path);

    if let Some(qs) = query_str {
        for (key, value) in parse_query(qs) {
            builder = builder.query_param(key, value);
        }
    }

    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| MalformedInvocationError::BadHeader(line.to_string()))?;
        if name.is_empty() {
            return Err(MalformedInvocationError::BadHeader(line.to_string()));
        }
        builder = builder.header(name.trim(), value.trim());
    }

    Ok(builder.body(Bytes::copy_from_slice(body)).build())
}

/// Split raw bytes into head and body at the first blank line.
///
/// Accepts CRLFCRLF or LFLF as the separator, whichever occurs first:
/// a bare-LF head must not be split at a CRLFCRLF that only appears
/// inside the body. Without a separator, the whole input is the head
/// and the body is empty.
fn split_head(raw: &[u8]) -> (&[u8], &[u8]) {
    let crlf = find(raw, b"\r\n\r\n");
    let lflf = find(raw, b"\n\n");
    match (crlf, lflf) {
        (Some(c), Some(l)) if l < c => (&raw[..l], &raw[l + 2..]),
        (Some(c), _) => (&raw[..c], &raw[c + 4..]),
        (None, Some(l)) => (&raw[..l], &raw[l + 2..]),
        (None, None) => (raw, &[]),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Parse `METHOD SP target SP version` into (method, target).
fn parse_request_line(line: &str) -> Result<(&str, &str), MalformedInvocationError> {
    let mut parts = line.split_whitespace();
    let method = parts
        .next()
        .ok_or(MalformedInvocationError::MissingMethod)?;
    let target = parts
        .next()
        .ok_or_else(|| MalformedInvocationError::BadRequestLine(line.to_string()))?;
    // A version token must be present; anything after it is garbage.
    match (parts.next(), parts.next()) {
        (Some(_), None) => Ok((method, target)),
        _ => Err(MalformedInvocationError::BadRequestLine(line.to_string())),
    }
}

/// Decode a query string into key/value pairs in document order.
///
/// `+` decodes to space and valid `%XX` escapes decode; invalid escapes
/// pass through literally so decoding is total. Pairs without `=` get an
/// empty value. Callers that collapse duplicates keep the last pair.
pub fn parse_query(qs: &str) -> impl Iterator<Item = (String, String)> + '_ {
    qs.split('&').filter(|p| !p.is_empty()).map(|pair| {
        let (key, value) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        (percent_decode(key), percent_decode(value))
    })
}

/// Total percent-decoder: `+` becomes space, bad escapes stay literal.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match (hex_val(bytes.get(i + 1)), hex_val(bytes.get(i + 2))) {
                (Some(hi), Some(lo)) => {
                    out.push(hi * 16 + lo);
                    i += 3;
                }
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: Option<&u8>) -> Option<u8> {
    b.and_then(|b| (*b as char).to_digit(16)).map(|d| d as u8)
}
