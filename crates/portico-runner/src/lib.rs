//! portico-runner: the invocation pipeline.
//!
//! The [`Runner`] owns one registered handler and drives each
//! invocation through the fixed three-stage pipeline:
//!
//! ```text
//! platform input
//!   │
//!   ▼
//! invocation adapter (portico-http or portico-event)
//!   │
//!   ▼
//! Handler::handle
//!   │
//!   ▼
//! response serializer
//!   │
//!   ▼
//! platform output
//! ```
//!
//! Recoverable failures short-circuit into fixed 400/500 responses, so
//! every invocation produces exactly one well-formed output. The
//! [`HttpFront`] serves the same pipeline from a TCP listener using
//! hyper.

pub mod front;
pub mod runner;

pub use front::HttpFront;
pub use runner::Runner;
