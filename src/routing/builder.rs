//! Fluent per-path registration.

use axum::http::Method;

use crate::http::handler::{Middleware, Request};
use crate::http::response::ResponseWriter;
use crate::routing::router::Router;

/// Accumulates middleware for one path, then registers methods on it.
///
/// The accumulated middleware runs after the scope's own chain. Each
/// terminal call registers independently, so one builder can register
/// several methods on the same path.
#[derive(Clone)]
pub struct RouteBuilder {
    router: Router,
    path: String,
    middlewares: Vec<Middleware>,
}

macro_rules! builder_routes {
    ($($method:ident => $verb:expr;)*) => {
        $(
            #[doc = concat!("Register a `", stringify!($method), "` handler on this path.")]
            pub fn $method<F>(&self, handler: F)
            where
                F: Fn(&Request, &mut dyn ResponseWriter) + Send + Sync + 'static,
            {
                self.handle($verb, handler);
            }
        )*
    };
}

impl RouteBuilder {
    pub(crate) fn new(router: Router, path: &str) -> Self {
        Self {
            router,
            path: path.to_string(),
            middlewares: Vec::new(),
        }
    }

    /// Append middleware for this path.
    pub fn use_middleware<I>(mut self, middlewares: I) -> Self
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.middlewares.extend(middlewares);
        self
    }

    /// Alias of [`RouteBuilder::use_middleware`].
    pub fn with<I>(self, middlewares: I) -> Self
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.use_middleware(middlewares)
    }

    /// Path as given, before the scope prefix is applied.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Register `handler` for any method, including extension verbs.
    pub fn handle<F>(&self, method: Method, handler: F)
    where
        F: Fn(&Request, &mut dyn ResponseWriter) + Send + Sync + 'static,
    {
        self.router
            .handle_with(method, &self.path, handler, self.middlewares.iter().cloned());
    }

    builder_routes! {
        get => Method::GET;
        post => Method::POST;
        put => Method::PUT;
        delete => Method::DELETE;
        patch => Method::PATCH;
        head => Method::HEAD;
        options => Method::OPTIONS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::Handler;
    use std::sync::{Arc, Mutex};

    fn logging(name: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Middleware {
        Middleware::new(move |next: Handler| {
            let log = log.clone();
            Handler::new(move |req, w| {
                log.lock().unwrap().push(name);
                next.call(req, w);
            })
        })
    }

    #[test]
    fn test_builder_does_not_touch_scope() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new();
        let builder = router.group("/api").route("/x").with([logging("m", log)]);

        assert_eq!(builder.path(), "/x");
        assert_eq!(router.middleware_len(), 0);
    }

    #[test]
    fn test_builder_registers_several_methods() {
        let router = Router::new();
        let builder = router.route("items");
        builder.get(|_req, _w| {});
        builder.post(|_req, _w| {});
        builder.handle(Method::from_bytes(b"PURGE").unwrap(), |_req, _w| {});

        assert_eq!(router.bound_paths(), vec!["/items"]);
        let methods: Vec<String> = router
            .allowed_methods("/items")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(methods, vec!["GET", "POST", "PURGE"]);
    }
}
