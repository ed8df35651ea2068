//! Metrics collection and export for Huddle.
//!
//! Uses the `metrics` crate for instrumentation and exports
//! to Prometheus format.

use huddle_core::PublishReport;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// Metric names.
pub mod names {
    pub const DRAFTS_TOTAL: &str = "huddle_drafts_total";
    pub const DRAFTS_DECLINED_TOTAL: &str = "huddle_drafts_declined_total";
    pub const DRAFT_LATENCY_SECONDS: &str = "huddle_draft_latency_seconds";
    pub const CONNECTIONS_TOTAL: &str = "huddle_connections_total";
    pub const OBSERVERS_ACTIVE: &str = "huddle_observers_active";
    pub const EVENTS_DELIVERED_TOTAL: &str = "huddle_events_delivered_total";
    pub const OBSERVERS_DROPPED_TOTAL: &str = "huddle_observers_dropped_total";
    pub const ERRORS_TOTAL: &str = "huddle_errors_total";
}

/// Initialize the metrics system.
pub fn init_metrics() {
    metrics::describe_counter!(names::DRAFTS_TOTAL, "Total number of successful drafts");
    metrics::describe_counter!(
        names::DRAFTS_DECLINED_TOTAL,
        "Total number of declined draft requests"
    );
    metrics::describe_histogram!(
        names::DRAFT_LATENCY_SECONDS,
        "Draft request handling latency in seconds"
    );
    metrics::describe_counter!(
        names::CONNECTIONS_TOTAL,
        "Total number of observer connections since server start"
    );
    metrics::describe_gauge!(
        names::OBSERVERS_ACTIVE,
        "Current number of connected observers"
    );
    metrics::describe_counter!(
        names::EVENTS_DELIVERED_TOTAL,
        "Total number of draft events queued for observers"
    );
    metrics::describe_counter!(
        names::OBSERVERS_DROPPED_TOTAL,
        "Total number of observers dropped after a failed delivery"
    );
    metrics::describe_counter!(names::ERRORS_TOTAL, "Total number of transport errors");

    info!("Metrics initialized");
}

/// Start the Prometheus metrics server.
///
/// # Errors
///
/// Returns an error if the server cannot be started.
pub fn start_metrics_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    info!("Metrics server listening on {}", addr);
    Ok(())
}

/// Record a successful draft and its fan-out.
pub fn record_draft(report: &PublishReport) {
    counter!(names::DRAFTS_TOTAL).increment(1);
    counter!(names::EVENTS_DELIVERED_TOTAL).increment(report.delivered as u64);
    if report.dropped > 0 {
        counter!(names::OBSERVERS_DROPPED_TOTAL).increment(report.dropped as u64);
    }
}

/// Record a declined draft request.
pub fn record_declined(reason: &str) {
    counter!(names::DRAFTS_DECLINED_TOTAL, "reason" => reason.to_string()).increment(1);
}

/// Record draft handling latency.
pub fn record_latency(seconds: f64) {
    histogram!(names::DRAFT_LATENCY_SECONDS).record(seconds);
}

/// Record a transport error.
pub fn record_error(error_type: &str) {
    counter!(names::ERRORS_TOTAL, "type" => error_type.to_string()).increment(1);
}

/// Metrics guard for one observer connection; records the disconnect on drop.
pub struct ConnectionMetricsGuard;

impl ConnectionMetricsGuard {
    /// Create a new metrics guard, recording a connection over `transport`.
    #[must_use]
    pub fn new(transport: &str) -> Self {
        counter!(names::CONNECTIONS_TOTAL, "transport" => transport.to_string()).increment(1);
        gauge!(names::OBSERVERS_ACTIVE).increment(1.0);
        Self
    }
}

impl Drop for ConnectionMetricsGuard {
    fn drop(&mut self) {
        gauge!(names::OBSERVERS_ACTIVE).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_guard() {
        // No recorder installed: just make sure nothing panics.
        let _guard = ConnectionMetricsGuard::new("sse");
        record_draft(&PublishReport {
            delivered: 3,
            dropped: 1,
        });
        record_declined("already_drafted");
    }
}
