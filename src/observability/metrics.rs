//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cep_requests_total` (counter): handled requests by service, status
//! - `cep_request_duration_seconds` (histogram): handler latency
//! - `cep_upstream_calls_total` (counter): dependency calls by outcome
//! - `cep_upstream_duration_seconds` (histogram): dependency latency
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint and install the global recorder.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a handled inbound request.
pub fn record_request(service: &'static str, status: u16, latency: Duration) {
    let status = status.to_string();
    counter!("cep_requests_total", "service" => service, "status" => status.clone())
        .increment(1);
    histogram!("cep_request_duration_seconds", "service" => service, "status" => status)
        .record(latency.as_secs_f64());
}

/// Record one outbound call to an external dependency.
pub fn record_upstream(dependency: &'static str, outcome: &'static str, start: Instant) {
    counter!("cep_upstream_calls_total", "dependency" => dependency, "outcome" => outcome)
        .increment(1);
    histogram!("cep_upstream_duration_seconds", "dependency" => dependency)
        .record(start.elapsed().as_secs_f64());
}
