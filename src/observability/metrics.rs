//! Metrics collection and exposition.
//!
//! # Metrics
//! - `webfront_requests_total` (counter): requests by method, status
//! - `webfront_request_duration_seconds` (histogram): latency distribution
//! - `webfront_robot_requests_total` (counter): requests classified as robots
//! - `webfront_alt_route_dispatch_total` (counter): fallback lookups by result
//! - `webfront_handler_panics_total` (counter): faults caught by the barrier
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "webfront_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("webfront_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_robot() {
    counter!("webfront_robot_requests_total").increment(1);
}

pub fn record_alt_dispatch(matched: bool) {
    let result = if matched { "matched" } else { "unmatched" };
    counter!("webfront_alt_route_dispatch_total", "result" => result).increment(1);
}

pub fn record_panic() {
    counter!("webfront_handler_panics_total").increment(1);
}
