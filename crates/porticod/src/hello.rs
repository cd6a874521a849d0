//! The built-in hello-world handler.

use portico_core::{Handler, HandlerError, Request, Response};

/// Returns a static HTML greeting for every request.
///
/// This is the whole of the daemon's business logic; real embedders
/// register their own [`Handler`] instead.
pub struct HelloHandler {
    server_header: Option<String>,
}

impl HelloHandler {
    pub fn new(server_header: Option<String>) -> Self {
        Self { server_header }
    }
}

impl Handler for HelloHandler {
    fn handle(&self, _req: Request) -> Result<Response, HandlerError> {
        let mut builder = Response::builder(200).header("Content-Type", "text/html");
        if let Some(name) = &self.server_header {
            builder = builder.header("Server", name);
        }
        Ok(builder.body("Hello world!").build())
    }
}
