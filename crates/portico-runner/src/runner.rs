//! The invocation pipeline.
//!
//! One `Runner` is constructed at process start with the single
//! registered handler and is shared by every invocation; it holds no
//! per-invocation state. Each invocation runs adapt, handle, serialize
//! in that order, synchronously, with error short-circuiting:
//!
//! - adapter failure: fixed 400, the handler is never called
//! - handler failure: fixed 500, detail goes to the log only
//! - unserializable handler response: fixed 500
//!
//! Panics inside the handler are not caught; they propagate to the
//! platform's own failure handling.

use std::sync::Arc;

use portico_core::{Handler, Request, Response};
use tracing::{error, warn};

type AfterResponseHook = Arc<dyn Fn(u16) + Send + Sync>;

/// The fixed pipeline orchestrating one invocation end-to-end.
pub struct Runner {
    handler: Arc<dyn Handler>,
    after_response: Option<AfterResponseHook>,
}

impl Runner {
    /// Create a runner around the one registered handler.
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            handler,
            after_response: None,
        }
    }

    /// Register a deferred-cleanup hook, fired once per invocation after
    /// the serialized output exists. The hook receives the status code
    /// of the response just produced and cannot alter it.
    pub fn on_after_response(mut self, hook: impl Fn(u16) + Send + Sync + 'static) -> Self {
        self.after_response = Some(Arc::new(hook));
        self
    }

    /// Run one raw-HTTP invocation: request bytes in, response bytes out.
    ///
    /// Infallible by policy: adapter and handler failures become 400/500
    /// wire responses instead of errors.
    pub fn invoke_http(&self, raw: &[u8]) -> Vec<u8> {
        let response = match portico_http::parse_request(raw) {
            Ok(req) => self.dispatch(req),
            Err(e) => {
                warn!(error = %e, "malformed invocation");
                bad_request()
            }
        };

        let (output, status) = match portico_http::write_response(&response) {
            Ok(bytes) => (bytes, response.status()),
            Err(e) => {
                error!(error = %e, "handler response failed to serialize");
                let fallback = portico_http::write_response(&internal_error())
                    .expect("fixed responses always serialize");
                (fallback, 500)
            }
        };

        self.fire_after_response(status);
        output
    }

    /// Run one structured-event invocation: event document in, result
    /// document out. Same error policy as [`invoke_http`].
    ///
    /// [`invoke_http`]: Runner::invoke_http
    pub fn invoke_event(&self, raw: &[u8]) -> serde_json::Value {
        let response = match portico_event::from_event(raw) {
            Ok(req) => self.dispatch(req),
            Err(e) => {
                warn!(error = %e, "malformed invocation event");
                bad_request()
            }
        };

        let (output, status) = match portico_event::to_event(&response) {
            Ok(doc) => (doc, response.status()),
            Err(e) => {
                error!(error = %e, "handler response failed to serialize");
                let fallback = portico_event::to_event(&internal_error())
                    .expect("fixed responses always serialize");
                (fallback, 500)
            }
        };

        self.fire_after_response(status);
        output
    }

    /// Handle an already-normalized request. Used by the HTTP front-end,
    /// which does its own adapting and serializing through hyper.
    pub fn dispatch(&self, req: Request) -> Response {
        match self.handler.handle(req) {
            Ok(resp) => resp,
            Err(e) => {
                error!(error = %e, "handler failed");
                internal_error()
            }
        }
    }

    pub(crate) fn fire_after_response(&self, status: u16) {
        if let Some(hook) = &self.after_response {
            hook(status);
        }
    }
}

/// Fixed response for invocations that could not be normalized.
pub(crate) fn bad_request() -> Response {
    Response::builder(400)
        .header("Content-Type", "text/plain")
        .body("Bad Request")
        .build()
}

/// Fixed response for handler failures. Generic on purpose: internal
/// detail stays in the log.
pub(crate) fn internal_error() -> Response {
    Response::builder(500)
        .header("Content-Type", "text/plain")
        .body("Internal Server Error")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::{FnHandler, HandlerError};
    use std::sync::atomic::{AtomicU16, Ordering};

    fn hello_runner() -> Runner {
        Runner::new(Arc::new(FnHandler::new(|_| {
            Ok(Response::builder(200)
                .header("Content-Type", "text/html")
                .body("Hello world!")
                .build())
        })))
    }

    #[test]
    fn http_invocation_end_to_end() {
        let runner = hello_runner();
        let out = runner.invoke_http(b"GET /?x=1&x=2 HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("Hello world!"));
    }

    #[test]
    fn event_invocation_end_to_end() {
        let runner = hello_runner();
        let out = runner.invoke_event(br#"{"httpMethod": "GET", "path": "/"}"#);
        assert_eq!(out["statusCode"], 200);
        assert_eq!(out["body"], "Hello world!");
    }

    #[test]
    fn malformed_invocation_yields_400() {
        let runner = hello_runner();
        let out = runner.invoke_http(b"\r\n\r\n");
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[test]
    fn malformed_event_yields_400() {
        let runner = hello_runner();
        let out = runner.invoke_event(br#"{"path": "/no-method"}"#);
        assert_eq!(out["statusCode"], 400);
    }

    #[test]
    fn handler_error_yields_generic_500() {
        let runner = Runner::new(Arc::new(FnHandler::new(|_| {
            Err(HandlerError::new("secret database password leaked"))
        })));
        let out = runner.invoke_http(b"GET / HTTP/1.1\r\n\r\n");
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn invalid_handler_status_yields_500() {
        let runner = Runner::new(Arc::new(FnHandler::new(|_| {
            Ok(Response::builder(777).build())
        })));
        let out = runner.invoke_http(b"GET / HTTP/1.1\r\n\r\n");
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 500 "));
    }

    #[test]
    fn after_response_hook_sees_final_status() {
        static LAST_STATUS: AtomicU16 = AtomicU16::new(0);
        let runner = hello_runner()
            .on_after_response(|status| LAST_STATUS.store(status, Ordering::SeqCst));

        runner.invoke_http(b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(LAST_STATUS.load(Ordering::SeqCst), 200);

        runner.invoke_http(b"garbage");
        assert_eq!(LAST_STATUS.load(Ordering::SeqCst), 400);
    }
}
