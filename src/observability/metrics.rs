//! Metrics collection and exposition.
//!
//! # Metrics
//! - `logstore_http_requests_total` (counter): requests by method, route, status
//! - `logstore_http_request_duration_seconds` (histogram): latency distribution
//! - `logstore_submissions_total` (counter): submit outcomes by kind
//! - `logstore_rpc_health` (gauge): 1=reachable, 0=unreachable
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use ::metrics::Label;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = vec![
        Label::new("method", method.to_string()),
        Label::new("route", route.to_string()),
        Label::new("status", status.to_string()),
    ];
    ::metrics::counter!("logstore_http_requests_total", labels.clone()).increment(1);
    ::metrics::histogram!("logstore_http_request_duration_seconds", labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one submission.
pub fn record_submission(outcome: &'static str) {
    ::metrics::counter!("logstore_submissions_total", "outcome" => outcome).increment(1);
}

/// Record RPC node reachability.
pub fn record_rpc_health(healthy: bool) {
    ::metrics::gauge!("logstore_rpc_health").set(if healthy { 1.0 } else { 0.0 });
}
