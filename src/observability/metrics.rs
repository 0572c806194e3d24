//! Metrics collection and exposition.
//!
//! # Metrics
//! - `docroute_requests_total` (counter): requests by resource, route, status
//! - `docroute_request_duration_seconds` (histogram): latency by resource
//! - `docroute_unmatched_total` (counter): requests no resource handled
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Route label is the verb or named route, never the raw path

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!("docroute_requests_total", "Requests handled by a resource");
    metrics::describe_histogram!(
        "docroute_request_duration_seconds",
        "Request latency in seconds"
    );
    metrics::describe_counter!(
        "docroute_unmatched_total",
        "Requests no mounted resource handled"
    );

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a request a resource answered.
pub fn record_request(resource: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("resource", resource.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("docroute_requests_total", &labels).increment(1);
    metrics::histogram!(
        "docroute_request_duration_seconds",
        "resource" => resource.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a request that fell through every mount.
pub fn record_unmatched() {
    metrics::counter!("docroute_unmatched_total").increment(1);
}
