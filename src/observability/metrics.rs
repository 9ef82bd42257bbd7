//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): conversions by outcome (document or error kind), status
//! - `relay_upstream_duration_seconds` (histogram): provider latency by mode

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record a finished conversion request.
pub fn record_request(outcome: &str, status: u16) {
    metrics::counter!(
        "relay_requests_total",
        "outcome" => outcome.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the latency of one provider call.
pub fn record_upstream_call(mode: &str, start: Instant) {
    metrics::histogram!(
        "relay_upstream_duration_seconds",
        "mode" => mode.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
