//! Normalized invocation values.
//!
//! A [`Request`] is built once per invocation by an invocation adapter
//! and is read-only afterwards. A [`Response`] is built by the handler
//! through [`ResponseBuilder`] and is read-only once returned. The
//! runner owns both for the duration of one invocation; nothing is
//! shared across invocations.

use std::collections::HashMap;

use bytes::Bytes;

/// Ordered, case-insensitive header multimap.
///
/// Preserves insertion order and the casing headers arrived with.
/// Lookup compares names case-insensitively; duplicate names keep every
/// value, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, keeping any existing values for the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value for `name`, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values for `name` in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One normalized inbound invocation.
///
/// Created by an invocation adapter, owned by the runner, dropped after
/// the handler returns. Method is always uppercase; duplicate query keys
/// have already been collapsed (last value wins).
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    path: String,
    headers: HeaderMap,
    query: HashMap<String, String>,
    body: Bytes,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Single query parameter by exact name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Builder used by the invocation adapters to assemble a [`Request`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: String,
    path: String,
    headers: HeaderMap,
    query: HashMap<String, String>,
    body: Bytes,
}

impl RequestBuilder {
    /// Set the method. Normalized to uppercase on `build`.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Append a header, preserving arrival order and duplicates.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set a query parameter. Setting the same key again overwrites,
    /// which gives the last-value-wins behavior for duplicate keys.
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method.to_ascii_uppercase(),
            path: if self.path.is_empty() { "/".to_string() } else { self.path },
            headers: self.headers,
            query: self.query,
            body: self.body,
        }
    }
}

/// One normalized outbound response.
///
/// Built by the handler via [`ResponseBuilder`]; immutable once built.
/// Status validity (100-599) is checked by the serializers, not here,
/// so a handler bug surfaces as a `SerializationError` instead of a
/// panic mid-handling.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Response {
    pub fn builder(status: u16) -> ResponseBuilder {
        ResponseBuilder {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Builder for [`Response`]; the only way handlers construct one.
#[derive(Debug)]
pub struct ResponseBuilder {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl ResponseBuilder {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}
