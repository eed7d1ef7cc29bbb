//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_requests_total` (counter): requests by method, status
//! - `lb_request_duration_seconds` (histogram): dispatcher latency
//! - `lb_selections_total` (counter): selections by backend
//! - `lb_no_healthy_backend_total` (counter): selections that found nothing
//! - `lb_backend_health` (gauge): 1=healthy, 0=unhealthy
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "lb_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("lb_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_selection(backend: &str) {
    metrics::counter!("lb_selections_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_no_healthy_backend() {
    metrics::counter!("lb_no_healthy_backend_total").increment(1);
}

pub fn record_backend_health(backend: &str, healthy: bool) {
    metrics::gauge!("lb_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
