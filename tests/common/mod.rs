//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use scoped_router::{Handler, HttpServer, Middleware, Router, ServerConfig, Shutdown};
use tower::ServiceExt;

/// Response pieces returned by [`send`].
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Send one in-process request through the router's service.
pub async fn send(router: &Router, method: Method, path: &str) -> TestResponse {
    send_request(
        router,
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// Send a prepared request through the router's service.
pub async fn send_request(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.service().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// Ordered record shared between middleware and handlers.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Middleware appending `name` to `log` before delegating.
pub fn recording(name: &'static str, log: &EventLog) -> Middleware {
    let log = log.clone();
    Middleware::new(move |next: Handler| {
        let log = log.clone();
        Handler::new(move |req, w| {
            log.lock().unwrap().push(name.to_string());
            next.call(req, w);
        })
    })
}

/// Start a real server for `router` on an ephemeral port.
pub async fn start_server(router: &Router, config: ServerConfig) -> (SocketAddr, Shutdown) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = HttpServer::new(router, config);
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown)
}
