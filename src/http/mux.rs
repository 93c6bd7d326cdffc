//! Transport binding on top of axum.
//!
//! # Responsibilities
//! - Bind one dispatcher per distinct normalized path
//! - Buffer request bodies and run the synchronous dispatch off the runtime
//! - Expose the bound paths as an axum service
//!
//! # Design Decisions
//! - Exact path matching only; unmatched paths hit the fallback (404)
//! - Paths are escaped so `{x}`, `:x` and `*` segments stay literal
//! - axum panics on a duplicate route, so callers must bind each path once
//! - Handlers run on the blocking pool, so tower timeouts can fire and a
//!   slow handler never stalls a runtime worker
//! - Bodies are buffered through the `Bytes` extractor, which honors
//!   `DefaultBodyLimit` (2 MiB unless a layer sets another limit)

use std::sync::{Mutex, PoisonError};

use axum::body::Bytes;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::any;

use crate::http::handler::Request;
use crate::http::response::BufferedResponse;
use crate::routing::table::Dispatcher;

struct MuxState {
    router: axum::Router,
    bound: Vec<String>,
}

/// Path multiplexer shared by every scope derived from one root router.
pub struct Mux {
    state: Mutex<MuxState>,
}

impl Mux {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MuxState {
                router: axum::Router::new().without_v07_checks(),
                bound: Vec::new(),
            }),
        }
    }

    /// Bind `dispatcher` to its path.
    pub fn bind(&self, dispatcher: Dispatcher) {
        let path = dispatcher.path().to_string();
        let route = literal_route(&path);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        // Built on a clone so a rejected route leaves the bound set intact.
        let router = state.router.clone().route(
            &route,
            any(move |parts: Parts, body: Bytes| {
                let dispatcher = dispatcher.clone();
                async move { serve(dispatcher, Request::from_parts(parts, body)).await }
            }),
        );
        state.router = router;
        state.bound.push(path.clone());

        tracing::debug!(path = %path, "Path bound to transport");
    }

    /// Paths bound so far, in binding order.
    pub fn bound_paths(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .bound
            .clone()
    }

    /// Snapshot of the bound routes as an axum service.
    pub fn service(&self) -> axum::Router {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .router
            .clone()
            .fallback(not_found)
    }
}

impl Default for Mux {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape `path` so axum matches it byte for byte.
fn literal_route(path: &str) -> String {
    path.replace('{', "{{").replace('}', "}}")
}

async fn serve(dispatcher: Dispatcher, req: Request) -> Response {
    let path = dispatcher.path().to_string();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut w = BufferedResponse::new();
        dispatcher.dispatch(&req, &mut w);
        w
    })
    .await;

    match outcome {
        Ok(w) => w.into_response(),
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Handler did not complete");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n").into_response()
        }
    }
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 page not found\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::Handler;
    use crate::routing::table::RouteTable;
    use axum::body::Body;
    use axum::http::Method;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn bind_text(mux: &Mux, table: &Arc<RouteTable>, path: &str, body: &'static str) {
        let handler = Handler::new(move |_req, w| {
            let _ = w.write(body.as_bytes());
        });
        if table.insert(path, Method::GET, handler, "") {
            mux.bind(Dispatcher::new(Arc::clone(table), path));
        }
    }

    async fn get(mux: &Mux, path: &str) -> (StatusCode, String) {
        let response = mux
            .service()
            .oneshot(
                axum::http::Request::get(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[test]
    fn test_literal_route_escapes_braces() {
        assert_eq!(literal_route("/a/{x}"), "/a/{{x}}");
        assert_eq!(literal_route("/plain"), "/plain");
        assert_eq!(literal_route("/users/:id"), "/users/:id");
    }

    #[tokio::test]
    async fn test_brace_segment_is_not_a_parameter() {
        let mux = Mux::new();
        let table = Arc::new(RouteTable::new());
        bind_text(&mux, &table, "/files/{name}", "hit");

        let (status, _) = get(&mux, "/files/anything").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_colon_and_star_segments_are_literal() {
        let mux = Mux::new();
        let table = Arc::new(RouteTable::new());
        bind_text(&mux, &table, "/users/:id", "colon");
        bind_text(&mux, &table, "/static/*", "star");

        assert_eq!(get(&mux, "/users/:id").await, (StatusCode::OK, "colon".into()));
        assert_eq!(get(&mux, "/static/*").await, (StatusCode::OK, "star".into()));
        assert_eq!(get(&mux, "/users/42").await.0, StatusCode::NOT_FOUND);
        assert_eq!(get(&mux, "/static/app.js").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_distinct_brace_paths_coexist() {
        let mux = Mux::new();
        let table = Arc::new(RouteTable::new());
        bind_text(&mux, &table, "/before", "before");
        bind_text(&mux, &table, "/a/{x}", "x");
        bind_text(&mux, &table, "/a/{y}", "y");

        assert_eq!(mux.bound_paths(), vec!["/before", "/a/{x}", "/a/{y}"]);
        assert_eq!(get(&mux, "/before").await, (StatusCode::OK, "before".into()));
    }

    #[tokio::test]
    async fn test_panicking_handler_is_internal_error() {
        let mux = Mux::new();
        let table = Arc::new(RouteTable::new());
        table.insert(
            "/boom",
            Method::GET,
            Handler::new(|_req, _w| panic!("handler failure")),
            "",
        );
        mux.bind(Dispatcher::new(Arc::clone(&table), "/boom"));

        assert_eq!(get(&mux, "/boom").await.0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_oversized_body_rejected_without_server_layers() {
        let mux = Mux::new();
        let table = Arc::new(RouteTable::new());
        bind_text(&mux, &table, "/upload", "ok");

        let oversized = vec![b'x'; 2 * 1024 * 1024 + 1];
        let response = mux
            .service()
            .oneshot(
                axum::http::Request::get("/upload")
                    .body(Body::from(oversized))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
