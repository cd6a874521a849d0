//! HTTP front-end.
//!
//! `HttpFront` binds a TCP listener and drives the runner from live
//! HTTP/1.1 connections: one tokio task per connection, hyper doing the
//! wire work, the normalized pipeline in the middle. Shutdown is a
//! watch channel flip.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use portico_core::{PorticoResult, Request, Response};
use portico_http::parse_query;

use crate::runner::{self, Runner};

/// HTTP front-end serving one [`Runner`].
pub struct HttpFront {
    bind_addr: SocketAddr,
    runner: Arc<Runner>,
}

impl HttpFront {
    /// Create a front-end bound to the given address.
    pub fn new(bind_addr: SocketAddr, runner: Arc<Runner>) -> Self {
        Self { bind_addr, runner }
    }

    /// Bind and serve until the shutdown signal flips.
    pub async fn serve(self, shutdown: tokio::sync::watch::Receiver<bool>) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .context("failed to bind HTTP front-end")?;
        serve_listener(self.runner, listener, shutdown).await
    }
}

/// Serve an already-bound listener. Split out from [`HttpFront::serve`]
/// so tests and embedders can bind port 0 themselves.
pub async fn serve_listener(
    runner: Arc<Runner>,
    listener: TcpListener,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let addr = listener.local_addr().context("listener has no address")?;
    info!(%addr, "HTTP front-end listening");

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                let (stream, peer_addr) = accept_result.context("accept failed")?;
                let runner = runner.clone();

                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let svc = service_fn(move |req: hyper::Request<Incoming>| {
                        let runner = runner.clone();
                        async move {
                            Ok::<_, hyper::Error>(handle_one(&runner, req).await)
                        }
                    });

                    if let Err(e) = http1::Builder::new().serve_connection(io, svc).await {
                        error!(%peer_addr, error = %e, "connection error");
                    }
                });
            }
            _ = shutdown.changed() => {
                info!("HTTP front-end shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Run one hyper request through the pipeline.
///
/// hyper already parsed the wire format, so adapting is a straight
/// conversion; the same normalization rules apply as in the byte codec.
/// Output conversion enforces the 100-599 status invariant, swapping in
/// the fixed 500 when a handler produced something unsendable.
async fn handle_one(
    runner: &Runner,
    req: hyper::Request<Incoming>,
) -> hyper::Response<Full<Bytes>> {
    let response = match normalize(req).await {
        Ok(normalized) => runner.dispatch(normalized),
        Err(e) => {
            warn!(error = %e, "malformed invocation");
            runner::bad_request()
        }
    };

    let (reply, status) = match to_hyper(&response) {
        Some(reply) => (reply, response.status()),
        None => {
            error!(status = response.status(), "handler response failed to serialize");
            let fallback = to_hyper(&runner::internal_error())
                .expect("fixed responses always serialize");
            (fallback, 500)
        }
    };

    runner.fire_after_response(status);
    reply
}

/// Convert a hyper request into the normalized [`Request`].
async fn normalize(req: hyper::Request<Incoming>) -> PorticoResult<Request> {
    let (parts, body) = req.into_parts();

    let mut builder = Request::builder()
        .method(parts.method.as_str())
        .path(parts.uri.path());

    if let Some(qs) = parts.uri.query() {
        for (key, value) in parse_query(qs) {
            builder = builder.query_param(key, value);
        }
    }

    for (name, value) in &parts.headers {
        builder = builder.header(
            name.as_str(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }

    let body = body
        .collect()
        .await
        .map_err(std::io::Error::other)?
        .to_bytes();

    Ok(builder.body(body).build())
}

/// Convert a normalized [`Response`] into a hyper response.
///
/// Returns `None` when the status is outside 100-599; hyper would
/// reject it anyway, and the caller substitutes the fixed 500.
fn to_hyper(resp: &Response) -> Option<hyper::Response<Full<Bytes>>> {
    if !(100..=599).contains(&resp.status()) {
        return None;
    }

    let mut builder = hyper::Response::builder().status(resp.status());
    for (name, value) in resp.headers() {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.body(Full::new(resp.body().clone())).ok()
}
