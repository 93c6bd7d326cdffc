//! Scoped HTTP router.
//!
//! Maps (method, path) pairs to handlers, nests path prefixes through
//! groups, and composes ordered middleware chains around handlers. Routes
//! are served through axum with exact path matching.
//!
//! ```no_run
//! use scoped_router::{Handler, Middleware, Router};
//!
//! # async fn run() -> Result<(), scoped_router::http::ServerError> {
//! let router = Router::new();
//! let api = router.group("/api");
//!
//! let header = Middleware::new(|next: Handler| {
//!     Handler::new(move |req, w| {
//!         w.headers_mut().insert("x-api", "1".parse().unwrap());
//!         next.call(req, w);
//!     })
//! });
//!
//! api.with([header]).get("/users", |_req, w| {
//!     let _ = w.write(b"users");
//! });
//!
//! router.listen_and_serve("127.0.0.1:8080").await
//! # }
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::{BufferedResponse, Handler, HttpServer, Middleware, Request, ResponseWriter};
pub use lifecycle::Shutdown;
pub use routing::{RouteBuilder, RouteInfo, Router};
