//! Error types shared across the Portico crates.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type PorticoResult<T> = Result<T, PorticoError>;

/// A raw invocation could not be normalized into a [`Request`].
///
/// Produced by the invocation adapters when the platform input cannot be
/// parsed into method + path + headers. The runner maps this to a fixed
/// 400 response.
///
/// [`Request`]: crate::Request
#[derive(Debug, Error)]
pub enum MalformedInvocationError {
    #[error("missing request method")]
    MissingMethod,

    #[error("malformed request line: {0}")]
    BadRequestLine(String),

    #[error("malformed header line: {0}")]
    BadHeader(String),

    #[error("invocation event is not valid: {0}")]
    BadEvent(String),

    #[error("invocation is empty")]
    Empty,
}

/// A failure surfaced by a [`Handler`].
///
/// The message is logged by the runner but never leaks into the
/// serialized response body; clients only ever see a generic 500.
///
/// [`Handler`]: crate::Handler
#[derive(Debug, Error)]
#[error("handler failed: {message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A [`Response`] is structurally invalid and cannot be serialized.
///
/// [`Response`]: crate::Response
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("status code {0} is outside the valid range 100-599")]
    StatusOutOfRange(u16),
}

/// Umbrella error for the runner and front-end.
#[derive(Debug, Error)]
pub enum PorticoError {
    #[error(transparent)]
    Malformed(#[from] MalformedInvocationError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
