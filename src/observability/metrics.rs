//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (request counts, latency)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `edge_requests_total` (counter): requests by method, status, route kind
//! - `edge_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Recording is a no-op until the exporter is installed, so tests and
//!   metrics-disabled deployments pay nothing
//! - Route kind (static/proxy) is the cardinality-safe routing label

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener. Call once at
/// startup, after the runtime is up.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, route_kind: &'static str, start: Instant) {
    let latency = start.elapsed().as_secs_f64();
    metrics::counter!(
        "edge_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route_kind
    )
    .increment(1);
    metrics::histogram!("edge_request_duration_seconds", "route" => route_kind).record(latency);
}
