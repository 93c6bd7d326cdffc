//! Handler and middleware abstractions.
//!
//! # Responsibilities
//! - Define the request type handlers receive
//! - Wrap user closures into cloneable, thread-safe handler values
//! - Wrap handler-to-handler transformations into middleware values
//!
//! # Design Decisions
//! - Handlers are synchronous and write into a `ResponseWriter` sink
//! - Both types are `Arc`-backed so cloning never copies captured state
//! - Composition happens once at registration, never per request

use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;

use crate::http::response::ResponseWriter;

/// A request with its body already buffered by the transport.
pub type Request = axum::http::Request<Bytes>;

type HandlerFn = dyn Fn(&Request, &mut dyn ResponseWriter) + Send + Sync;
type MiddlewareFn = dyn Fn(Handler) -> Handler + Send + Sync;

/// A request handler.
///
/// All output goes through the response sink; nothing is returned.
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Request, &mut dyn ResponseWriter) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invoke the handler.
    pub fn call(&self, req: &Request, w: &mut dyn ResponseWriter) {
        (self.0)(req, w)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

impl<F> From<F> for Handler
where
    F: Fn(&Request, &mut dyn ResponseWriter) + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Handler::new(f)
    }
}

/// A transformation from handler to handler.
///
/// The wrapping handler may run logic before and after delegating to the
/// wrapped one, or skip delegation entirely.
#[derive(Clone)]
pub struct Middleware(Arc<MiddlewareFn>);

impl Middleware {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap `next`, producing the outer handler.
    pub fn wrap(&self, next: Handler) -> Handler {
        (self.0)(next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}
