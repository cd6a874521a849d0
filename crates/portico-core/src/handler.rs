//! The handler contract.
//!
//! A [`Handler`] is the single polymorphic seam in Portico: the
//! embedding application registers exactly one instance with the runner
//! before serving begins, and the runner calls it exactly once per
//! invocation. There is no routing; what the handler does with the
//! request is its own business.

use crate::error::HandlerError;
use crate::types::{Request, Response};

/// User-supplied request handler.
///
/// Must be `Send + Sync` so concurrent invocations can share one
/// instance; the runner itself never mutates it. A handler that needs
/// internal state manages its own synchronization.
pub trait Handler: Send + Sync {
    fn handle(&self, req: Request) -> Result<Response, HandlerError>;
}

/// Adapter so plain closures can act as handlers.
pub struct FnHandler<F>(F);

impl<F> FnHandler<F>
where
    F: Fn(Request) -> Result<Response, HandlerError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(Request) -> Result<Response, HandlerError> + Send + Sync,
{
    fn handle(&self, req: Request) -> Result<Response, HandlerError> {
        (self.0)(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_handler_echoes_method() {
        let handler = FnHandler::new(|req: Request| {
            Ok(Response::builder(200).body(req.method().to_string()).build())
        });
        let req = Request::builder().method("post").path("/").build();
        let resp = handler.handle(req).unwrap();
        assert_eq!(resp.body().as_ref(), b"POST");
    }

    #[test]
    fn handler_failure_propagates() {
        let handler = FnHandler::new(|_| Err(HandlerError::new("boom")));
        let req = Request::builder().method("GET").path("/").build();
        let err = handler.handle(req).unwrap_err();
        assert_eq!(err.message(), "boom");
    }
}
