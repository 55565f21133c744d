//! Metrics collection and exposition.
//!
//! # Metrics
//! - `force_login_decisions_total` (counter): decisions by outcome
//!   (`allow`, `redirect`, `error`, `bypass`)
//! - `force_login_decision_duration_seconds` (histogram): evaluation latency
//! - `force_login_upstream_requests_total` (counter): forwarded requests by status
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter runs its own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(
                "force_login_decisions_total",
                "Force-login decisions by outcome"
            );
            describe_histogram!(
                "force_login_decision_duration_seconds",
                "Time spent evaluating the force-login gate"
            );
            describe_counter!(
                "force_login_upstream_requests_total",
                "Requests forwarded to the storefront by status"
            );
            tracing::info!(address = %addr, "Metrics endpoint listening");
        }
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder"),
    }
}

/// Record one gate outcome.
pub fn record_decision(outcome: &'static str, start: Instant) {
    counter!("force_login_decisions_total", "outcome" => outcome).increment(1);
    histogram!("force_login_decision_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one forwarded request.
pub fn record_upstream(status: u16) {
    counter!("force_login_upstream_requests_total", "status" => status.to_string()).increment(1);
}
