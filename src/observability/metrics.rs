//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define store and HTTP metrics
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `store_probe_total` (counter): startup liveness probes by outcome
//! - `store_probe_duration_seconds` (histogram): probe latency
//! - `store_commands_total` (counter): commands by op, outcome
//! - `store_command_duration_seconds` (histogram): command latency by op
//! - `store_connected` (gauge): 1 while the shared connection is open
//! - `http_requests_total` (counter): requests by route, status
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are static strings to keep cardinality bounded

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

pub fn record_store_probe(success: bool, start: Instant) {
    counter!("store_probe_total", "outcome" => outcome(success)).increment(1);
    histogram!("store_probe_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_store_command(op: &'static str, success: bool, start: Instant) {
    counter!("store_commands_total", "op" => op, "outcome" => outcome(success)).increment(1);
    histogram!("store_command_duration_seconds", "op" => op).record(start.elapsed().as_secs_f64());
}

pub fn record_store_connected(connected: bool) {
    gauge!("store_connected").set(if connected { 1.0 } else { 0.0 });
}

pub fn record_request(route: &'static str, status: u16) {
    counter!("http_requests_total", "route" => route, "status" => status.to_string()).increment(1);
}
