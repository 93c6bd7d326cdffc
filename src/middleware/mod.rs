//! Bundled middleware.
//!
//! Everything here is built on the public `Handler`/`Middleware` contract
//! and can be mixed freely with user middleware in any scope.
//!
//! # Available
//! - access_log.rs: combined or JSON access log lines
//! - compression.rs: gzip response bodies when the client accepts them
//! - request_id.rs: `x-request-id` propagation and a tracing span
//! - request_metrics.rs: request counters and latency histograms

pub mod access_log;
pub mod compression;
pub mod request_id;
pub mod request_metrics;

pub use access_log::{access_logging, AccessLogConfig, AccessLogEntry, AccessLogFormat, LogOutput};
pub use compression::compression;
pub use request_id::{request_id, X_REQUEST_ID};
pub use request_metrics::request_metrics;
