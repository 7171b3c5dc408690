//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): dispatches by outcome
//!   (`handled`, `not_found`, `error`)
//! - `dispatch_duration_seconds` (histogram): time spent in one dispatch
//! - `route_rewrites_total` (counter): paths changed by the route table
//! - `http_requests_total` (counter): front-end responses by method, status
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus exporter serves its own scrape endpoint

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a finished dispatch.
pub fn record_dispatch(outcome: &'static str, start: Instant) {
    metrics::counter!("dispatch_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("dispatch_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a path rewritten by the route table.
pub fn record_rewrite() {
    metrics::counter!("route_rewrites_total").increment(1);
}

/// Record a response sent by the HTTP front end.
pub fn record_http(method: &str, status: u16) {
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
