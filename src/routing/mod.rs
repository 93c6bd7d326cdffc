//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (before serving):
//!     Router scope (prefix + chain)
//!     → path.rs (join prefix and path)
//!     → chain.rs (compose middleware around the handler)
//!     → table.rs (store under path + method)
//!     → new path? bind a Dispatcher to the mux, once
//!
//! Dispatch (per request, path already matched by the transport):
//!     Dispatcher → table.rs (lookup by method)
//!     → finalized handler, or 405 with an Allow list
//! ```
//!
//! # Design Decisions
//! - Scopes share one table; derivation copies only prefix and chain
//! - Exact path matching; no wildcards or parameters
//! - Middleware order: scope chain, then per-route extras, then handler

pub mod builder;
pub mod chain;
pub mod introspect;
pub mod path;
pub mod router;
pub mod table;

pub use builder::RouteBuilder;
pub use chain::Chain;
pub use introspect::format_routes;
pub use path::join;
pub use router::Router;
pub use table::{Dispatcher, RouteInfo, RouteTable};
