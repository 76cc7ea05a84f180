//! Metrics collection and exposition.
//!
//! # Metrics
//! - `webhook_relay_requests_total` (counter): requests by method, status, outcome
//! - `webhook_relay_request_duration_seconds` (histogram): time to response head
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Values live in process memory only; the exporter serves them for scraping

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!(
        "webhook_relay_requests_total",
        "Webhook requests handled, by method, status and outcome"
    );
    describe_histogram!(
        "webhook_relay_request_duration_seconds",
        "Time from request arrival to response head"
    );

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record the outcome of one forwarding operation.
///
/// `outcome` is one of `relayed`, `not_found`, `rejected`, `upstream_error`.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start_time: Instant) {
    counter!(
        "webhook_relay_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "webhook_relay_request_duration_seconds",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .record(start_time.elapsed().as_secs_f64());
}
