//! End-to-end pipeline tests.
//!
//! Drives the runner through both platform codecs and through the
//! hyper front-end over a real TCP connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use portico_core::{FnHandler, Handler, HandlerError, Request, Response};
use portico_runner::{Runner, front};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn hello_handler() -> Arc<dyn Handler> {
    Arc::new(FnHandler::new(|_| {
        Ok(Response::builder(200)
            .header("Content-Type", "text/html")
            .body("Hello world!")
            .build())
    }))
}

fn echo_query_handler() -> Arc<dyn Handler> {
    Arc::new(FnHandler::new(|req: Request| {
        let x = req.query_param("x").unwrap_or("-").to_string();
        Ok(Response::builder(200).body(x).build())
    }))
}

#[test]
fn raw_http_scenario_from_start_to_finish() {
    let runner = Runner::new(hello_handler());
    let out = runner.invoke_http(b"GET /?x=1&x=2 HTTP/1.1\r\nHost: example\r\n\r\n");
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.ends_with("Hello world!"));
}

#[test]
fn duplicate_query_key_reaches_handler_as_last_value() {
    let runner = Runner::new(echo_query_handler());
    let out = runner.invoke_http(b"GET /?x=1&x=2 HTTP/1.1\r\n\r\n");
    let text = String::from_utf8(out).unwrap();
    assert!(text.ends_with("2"));
}

#[test]
fn both_codecs_agree_on_the_same_handler() {
    let runner = Runner::new(hello_handler());

    let wire = runner.invoke_http(b"GET /hello HTTP/1.1\r\n\r\n");
    assert!(String::from_utf8(wire).unwrap().ends_with("Hello world!"));

    let event = runner.invoke_event(br#"{"httpMethod": "GET", "path": "/hello"}"#);
    assert_eq!(event["statusCode"], 200);
    assert_eq!(event["body"], "Hello world!");
}

#[test]
fn every_outcome_is_a_wellformed_response() {
    // Whatever goes wrong, exactly one structurally valid output.
    let failing = Runner::new(Arc::new(FnHandler::new(|_| {
        Err(HandlerError::new("nope"))
    })));

    for raw in [
        &b"GET / HTTP/1.1\r\n\r\n"[..],
        b"no-version-here",
        b"",
        b"\r\n\r\n",
    ] {
        let text = String::from_utf8(failing.invoke_http(raw)).unwrap();
        let status: u16 = text
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .expect("status line present");
        assert!((100..=599).contains(&status), "bad status in {text}");
    }
}

#[test]
fn after_response_hook_fires_once_per_invocation() {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    let runner = Runner::new(hello_handler())
        .on_after_response(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    runner.invoke_http(b"GET / HTTP/1.1\r\n\r\n");
    runner.invoke_event(br#"{"httpMethod": "GET"}"#);
    runner.invoke_http(b"garbage");
    assert_eq!(fired.load(Ordering::SeqCst), 3);
}

async fn spawn_front(handler: Arc<dyn Handler>) -> (std::net::SocketAddr, tokio::sync::watch::Sender<bool>) {
    let runner = Arc::new(Runner::new(handler));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::watch::channel(false);
    tokio::spawn(front::serve_listener(runner, listener, rx));
    (addr, tx)
}

async fn send_raw(addr: std::net::SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn front_end_serves_hello_world_over_tcp() {
    let (addr, shutdown) = spawn_front(hello_handler()).await;

    let reply = send_raw(
        addr,
        b"GET /?x=1&x=2 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(reply.starts_with("HTTP/1.1 200 OK"));
    assert!(reply.ends_with("Hello world!"));

    shutdown.send(true).unwrap();
}

#[tokio::test]
async fn front_end_hides_handler_failures() {
    let (addr, shutdown) = spawn_front(Arc::new(FnHandler::new(|_| {
        Err(HandlerError::new("connection string with password"))
    })))
    .await;

    let reply = send_raw(
        addr,
        b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(reply.starts_with("HTTP/1.1 500"));
    assert!(!reply.contains("password"));

    shutdown.send(true).unwrap();
}

#[tokio::test]
async fn front_end_handles_concurrent_invocations_independently() {
    let handler = Arc::new(FnHandler::new(|req: Request| {
        Ok(Response::builder(200)
            .body(req.path().to_string())
            .build())
    }));
    let (addr, shutdown) = spawn_front(handler).await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        tasks.push(tokio::spawn(async move {
            let raw = format!("GET /req-{i} HTTP/1.1\r\nConnection: close\r\n\r\n");
            (i, send_raw(addr, raw.as_bytes()).await)
        }));
    }

    for task in tasks {
        let (i, reply) = task.await.unwrap();
        assert!(reply.ends_with(&format!("/req-{i}")));
    }

    shutdown.send(true).unwrap();
}
