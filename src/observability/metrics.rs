//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): dispatches by `outcome`
//!   (invoked, deflected, fallback, not_found, failed)
//! - `dispatch_duration_seconds` (histogram): time spent in dispatch,
//!   handler included
//! - `dispatch_routes` (gauge): routes in the active table
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter serves its own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and start its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one dispatch and record its latency.
pub fn record_dispatch(outcome: &'static str, start: Instant) {
    metrics::counter!("dispatch_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("dispatch_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Publish the size of the active route table.
pub fn record_route_count(count: usize) {
    metrics::gauge!("dispatch_routes").set(count as f64);
}
