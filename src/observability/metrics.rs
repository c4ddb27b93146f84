//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define relay metrics (request counts, latency, rejections, cache)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by method, status, route
//! - `relay_request_duration_seconds` (histogram): latency distribution
//! - `relay_rejections_total` (counter): terminal rejections by reason
//! - `relay_route_cache_total` (counter): lookups by hit/miss
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations under the facade)
//! - Route ids are already opaque, so they are safe as label values

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics endpoint started");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one completed relay request.
pub fn record_request(method: &str, status: u16, route_id: &str, start: Instant) {
    metrics::counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route_id.to_string(),
    )
    .increment(1);
    metrics::histogram!(
        "relay_request_duration_seconds",
        "method" => method.to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one terminal rejection (disabled, not-found, traversal,
/// transport, blocked).
pub fn record_rejection(reason: &'static str) {
    metrics::counter!("relay_rejections_total", "reason" => reason).increment(1);
}

/// Record a route cache lookup outcome.
pub fn record_route_cache(result: &'static str) {
    metrics::counter!("relay_route_cache_total", "result" => result).increment(1);
}
