//! portico-core: normalized request/response model for Portico.
//!
//! Portico bridges platform-native invocations (raw HTTP/1.1 bytes or a
//! structured serverless event) to a single user-supplied [`Handler`].
//! This crate holds the pieces every other Portico crate speaks through:
//!
//! - [`Request`] / [`Response`]: the normalized invocation values
//! - [`Handler`]: the one polymorphic seam between the pipeline and
//!   user code
//! - the error taxonomy ([`MalformedInvocationError`], [`HandlerError`],
//!   [`SerializationError`])
//!
//! No I/O happens here; codecs and the pipeline live in the sibling
//! crates.

pub mod error;
pub mod handler;
pub mod types;

pub use error::{
    HandlerError, MalformedInvocationError, PorticoError, PorticoResult, SerializationError,
};
pub use handler::{FnHandler, Handler};
pub use types::{HeaderMap, Request, RequestBuilder, Response, ResponseBuilder};
