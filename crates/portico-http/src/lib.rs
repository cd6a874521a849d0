//! portico-http: the raw-HTTP platform codec.
//!
//! For platforms that hand Portico an HTTP/1.1 request as bytes (a raw
//! socket read, a CGI-style buffer, a test fixture), this crate turns
//! those bytes into a normalized `Request` and a normalized `Response`
//! back into wire bytes:
//!
//! ```text
//! raw bytes ──parse_request──▶ Request
//! Response ──write_response──▶ raw bytes
//! ```
//!
//! Both directions are pure: no sockets, no logging, no state. The
//! serving loop that feeds this codec lives in portico-runner.

pub mod parse;
pub mod write;

pub use parse::{parse_query, parse_request};
pub use write::write_response;
