//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (axum app, tower-http layers)
//!     → mux.rs (exact path match, body buffering)
//!     → routing Dispatcher (method lookup)
//!     → handler.rs (finalized handler writes into response.rs sink)
//!     → BufferedResponse converted to an axum response
//! ```

pub mod handler;
pub mod mux;
pub mod response;
pub mod server;

pub use handler::{Handler, Middleware, Request};
pub use mux::Mux;
pub use response::{BufferedResponse, ResponseWriter};
pub use server::{HttpServer, ServerError};
