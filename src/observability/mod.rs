//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing, server and middleware produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and histograms via the metrics facade)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the request_id middleware span
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
