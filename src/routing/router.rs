//! Router scopes.
//!
//! # Responsibilities
//! - Register (method, path) pairs against the shared route table
//! - Derive new scopes via `group`, `use_middleware`/`with` and `route`
//! - Bind each new path to the transport exactly once
//! - Expose the bound routes as an axum service and serve them
//!
//! # Design Decisions
//! - A scope is a cheap handle: shared table and mux, owned prefix and chain
//! - Derivation copies the chain, so sibling scopes never observe each
//!   other's later additions
//! - Middleware is composed at registration time, not per request

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;

use crate::config::{ServerConfig, TlsConfig};
use crate::http::handler::{Handler, Middleware, Request};
use crate::http::mux::Mux;
use crate::http::response::ResponseWriter;
use crate::http::server::{HttpServer, ServerError};
use crate::lifecycle::{trigger_on_ctrl_c, Shutdown};
use crate::middleware::access_log::{access_logging, AccessLogConfig, AccessLogFormat};
use crate::routing::builder::RouteBuilder;
use crate::routing::chain::Chain;
use crate::routing::introspect::format_routes;
use crate::routing::path::join;
use crate::routing::table::{Dispatcher, RouteInfo, RouteTable};

/// A routing scope: prefix and middleware over a shared route table.
#[derive(Clone)]
pub struct Router {
    table: Arc<RouteTable>,
    mux: Arc<Mux>,
    prefix: String,
    chain: Chain,
}

macro_rules! method_routes {
    ($($method:ident, $with:ident => $verb:expr;)*) => {
        $(
            #[doc = concat!("Register a `", stringify!($method), "` handler on `path`.")]
            pub fn $method<F>(&self, path: &str, handler: F)
            where
                F: Fn(&Request, &mut dyn ResponseWriter) + Send + Sync + 'static,
            {
                self.handle($verb, path, handler);
            }

            #[doc = concat!(
                "Register a `", stringify!($method),
                "` handler with extra middleware applied after this scope's chain."
            )]
            pub fn $with<F, I>(&self, path: &str, handler: F, middlewares: I)
            where
                F: Fn(&Request, &mut dyn ResponseWriter) + Send + Sync + 'static,
                I: IntoIterator<Item = Middleware>,
            {
                self.handle_with($verb, path, handler, middlewares);
            }
        )*
    };
}

impl Router {
    /// A root scope with an empty prefix and no middleware.
    pub fn new() -> Self {
        Self {
            table: Arc::new(RouteTable::new()),
            mux: Arc::new(Mux::new()),
            prefix: String::new(),
            chain: Chain::new(),
        }
    }

    /// A root scope with combined-format access logging to stdout.
    pub fn with_defaults() -> Self {
        Self::new().use_middleware([access_logging(AccessLogConfig::stdout(
            AccessLogFormat::Combined,
        ))])
    }

    /// Prefix of this scope; empty for the root.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of middleware applied to routes registered on this scope.
    pub fn middleware_len(&self) -> usize {
        self.chain.len()
    }

    /// A child scope under `prefix`, inheriting the current middleware.
    pub fn group(&self, prefix: &str) -> Router {
        Router {
            table: Arc::clone(&self.table),
            mux: Arc::clone(&self.mux),
            prefix: join(&self.prefix, prefix),
            chain: self.chain.clone(),
        }
    }

    /// A scope with `middlewares` appended to the current chain.
    pub fn use_middleware<I>(&self, middlewares: I) -> Router
    where
        I: IntoIterator<Item = Middleware>,
    {
        Router {
            table: Arc::clone(&self.table),
            mux: Arc::clone(&self.mux),
            prefix: self.prefix.clone(),
            chain: self.chain.extend(middlewares),
        }
    }

    /// Alias of [`Router::use_middleware`].
    pub fn with<I>(&self, middlewares: I) -> Router
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.use_middleware(middlewares)
    }

    /// Start a per-path builder; `path` is joined when a method is registered.
    pub fn route(&self, path: &str) -> RouteBuilder {
        RouteBuilder::new(self.clone(), path)
    }

    /// Register `handler` for `method` on `path` under this scope.
    pub fn handle<F>(&self, method: Method, path: &str, handler: F)
    where
        F: Fn(&Request, &mut dyn ResponseWriter) + Send + Sync + 'static,
    {
        self.register(method, path, Handler::new(handler));
    }

    /// Register with extra middleware for this path only.
    ///
    /// An empty `middlewares` registers directly on this scope.
    pub fn handle_with<F, I>(&self, method: Method, path: &str, handler: F, middlewares: I)
    where
        F: Fn(&Request, &mut dyn ResponseWriter) + Send + Sync + 'static,
        I: IntoIterator<Item = Middleware>,
    {
        let mut middlewares = middlewares.into_iter().peekable();
        if middlewares.peek().is_some() {
            self.with(middlewares).handle(method, path, handler);
        } else {
            self.handle(method, path, handler);
        }
    }

    method_routes! {
        get, get_with => Method::GET;
        post, post_with => Method::POST;
        put, put_with => Method::PUT;
        delete, delete_with => Method::DELETE;
        patch, patch_with => Method::PATCH;
        head, head_with => Method::HEAD;
        options, options_with => Method::OPTIONS;
    }

    pub(crate) fn register(&self, method: Method, path: &str, handler: Handler) {
        let full_path = join(&self.prefix, path);
        let finalized = self.chain.finalize(handler);

        tracing::debug!(
            method = %method,
            path = %full_path,
            prefix = %self.prefix,
            middlewares = self.chain.len(),
            "Registering route"
        );

        if self.table.insert(&full_path, method, finalized, &self.prefix) {
            self.mux
                .bind(Dispatcher::new(Arc::clone(&self.table), &full_path));
        }
    }

    /// Methods registered for a normalized path, sorted by name.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        self.table.allowed_methods(path)
    }

    /// Every registration, sorted by path then method.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.table.routes()
    }

    /// Paths bound to the transport, in binding order.
    pub fn bound_paths(&self) -> Vec<String> {
        self.mux.bound_paths()
    }

    /// Print the route listing to stdout.
    pub fn print_routes(&self) {
        println!("{}", format_routes(&self.routes()));
    }

    /// The registered routes as an axum service.
    ///
    /// Routes registered afterwards are not part of the returned service.
    /// Request bodies are capped by axum's `DefaultBodyLimit` (2 MiB);
    /// [`HttpServer`] replaces that cap with the configured limit.
    pub fn service(&self) -> axum::Router {
        self.mux.service()
    }

    /// Serve plain HTTP on `addr` until Ctrl+C.
    pub async fn listen_and_serve(&self, addr: &str) -> Result<(), ServerError> {
        self.print_routes();

        let mut config = ServerConfig::default();
        config.listener.bind_address = addr.to_string();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(ServerError::Bind)?;

        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        trigger_on_ctrl_c(shutdown);
        HttpServer::new(self, config).run(listener, receiver).await
    }

    /// Serve HTTPS on `addr` until Ctrl+C, using PEM certificate and key files.
    pub async fn listen_and_serve_tls(
        &self,
        addr: &str,
        cert_path: &str,
        key_path: &str,
    ) -> Result<(), ServerError> {
        self.print_routes();

        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| ServerError::InvalidAddress(addr.to_string(), e))?;
        let tls = TlsConfig {
            cert_path: cert_path.to_string(),
            key_path: key_path.to_string(),
        };

        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        trigger_on_ctrl_c(shutdown);
        HttpServer::new(self, ServerConfig::default())
            .run_tls(addr, &tls, receiver)
            .await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
