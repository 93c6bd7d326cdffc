//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by method, path, status
//! - `router_request_duration_seconds` (histogram): handler latency
//! - `router_method_not_allowed_total` (counter): 405s by path, method

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a finished request.
pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("router_requests_total", &labels).increment(1);
    metrics::histogram!("router_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a request whose method had no handler on a registered path.
pub fn record_method_not_allowed(path: &str, method: &str) {
    metrics::counter!(
        "router_method_not_allowed_total",
        "path" => path.to_string(),
        "method" => method.to_string()
    )
    .increment(1);
}
