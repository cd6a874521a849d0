//! portico-event: the structured-event platform codec.
//!
//! Serverless platforms deliver an HTTP request as a JSON document
//! instead of wire bytes. This crate decodes that document into a
//! normalized `Request` and encodes a normalized `Response` back into
//! the result document the platform expects:
//!
//! ```text
//! {"httpMethod": "GET", "path": "/", ...} ──from_event──▶ Request
//! Response ──to_event──▶ {"statusCode": 200, "headers": ..., "body": ...}
//! ```
//!
//! Binary bodies travel base64-encoded with the `isBase64Encoded` flag,
//! in both directions. The same normalization rules apply as for the
//! raw-HTTP codec: method uppercased, header order as it appears in the
//! document, last value wins for duplicate query keys.

pub mod codec;

pub use codec::{from_event, to_event};
