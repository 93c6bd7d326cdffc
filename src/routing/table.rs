//! Route storage and per-path method dispatch.
//!
//! # Responsibilities
//! - Map normalized paths to per-method finalized handlers
//! - Report whether a path is new so it is bound to the transport once
//! - Dispatch by method, answering 405 with an `Allow` list on a miss
//! - Keep the append-only registration log used for introspection
//!
//! # Design Decisions
//! - One `RwLock`: a writer during registration, many readers while serving
//! - Handlers are cloned out of the map before they run, so no lock is held
//!   while user code executes
//! - Entries are never removed; re-registration overwrites

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use axum::http::{header, HeaderValue, Method, StatusCode};

use crate::http::handler::{Handler, Request};
use crate::http::response::{self, ResponseWriter};
use crate::observability::metrics;

/// One registration, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: Method,
    pub path: String,
    pub prefix: String,
}

impl fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

#[derive(Default)]
struct TableState {
    routes: HashMap<String, HashMap<Method, Handler>>,
    log: Vec<RouteInfo>,
}

/// Route table shared by every scope derived from one root router.
#[derive(Default)]
pub struct RouteTable {
    state: RwLock<TableState>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handler` under `(path, method)`, overwriting any previous one.
    ///
    /// Returns `true` when `path` had no methods before this call, meaning
    /// the caller must bind a dispatcher for it.
    pub fn insert(&self, path: &str, method: Method, handler: Handler, prefix: &str) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        let is_new = !state.routes.contains_key(path);
        state
            .routes
            .entry(path.to_string())
            .or_default()
            .insert(method.clone(), handler);
        state.log.push(RouteInfo {
            method,
            path: path.to_string(),
            prefix: prefix.to_string(),
        });

        is_new
    }

    /// Whether any method is registered for `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.read().routes.contains_key(path)
    }

    /// Methods registered for `path`, sorted by name.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let state = self.read();
        let mut methods: Vec<Method> = state
            .routes
            .get(path)
            .map(|handlers| handlers.keys().cloned().collect())
            .unwrap_or_default();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    /// Registration log sorted by path, then method name.
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut routes = self.read().log.clone();
        routes.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.method.as_str().cmp(b.method.as_str()))
        });
        routes
    }

    /// Run the handler registered for the request's method on `path`.
    pub fn dispatch(&self, path: &str, req: &Request, w: &mut dyn ResponseWriter) {
        let handler = self
            .read()
            .routes
            .get(path)
            .and_then(|handlers| handlers.get(req.method()).cloned());

        match handler {
            Some(handler) => handler.call(req, w),
            None => self.method_not_allowed(path, req, w),
        }
    }

    fn method_not_allowed(&self, path: &str, req: &Request, w: &mut dyn ResponseWriter) {
        let allowed = self
            .allowed_methods(path)
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        tracing::debug!(
            path = %path,
            method = %req.method(),
            allowed = %allowed,
            "Method not allowed"
        );
        metrics::record_method_not_allowed(path, req.method().as_str());

        match HeaderValue::from_str(&allowed) {
            Ok(value) => {
                w.headers_mut().insert(header::ALLOW, value);
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Allow header not representable");
            }
        }
        response::error(w, "Method not allowed", StatusCode::METHOD_NOT_ALLOWED);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, TableState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Per-path entry point bound once to the transport.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
    path: Arc<str>,
}

impl Dispatcher {
    pub fn new(table: Arc<RouteTable>, path: &str) -> Self {
        Self {
            table,
            path: Arc::from(path),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn dispatch(&self, req: &Request, w: &mut dyn ResponseWriter) {
        self.table.dispatch(&self.path, req, w)
    }
}
