//! Prometheus metrics for upstream probes.
//!
//! Every call to [`UnipileClient::probe`](crate::unipile::UnipileClient::probe)
//! records one outcome and one latency sample, whether it was triggered by
//! the startup check, the `ping` command or the `/health/unipile` route.

use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Probe counter metric name.
pub const METRIC_PROBES_TOTAL: &str = "unipile_probes_total";
/// Probe latency metric name.
pub const METRIC_PROBE_LATENCY: &str = "unipile_probe_latency_ms";

/// Result of a single probe, used as the `outcome` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Upstream answered with 2xx.
    Success,
    /// Upstream answered with a non-2xx status.
    UpstreamError,
    /// No usable response (network error, timeout, unreadable body).
    Failure,
}

impl ProbeOutcome {
    /// Label value for this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeOutcome::Success => "success",
            ProbeOutcome::UpstreamError => "upstream_error",
            ProbeOutcome::Failure => "failure",
        }
    }
}

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Periodically drain histogram buckets so rendering stays cheap.
pub fn spawn_upkeep(handle: PrometheusHandle, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            handle.run_upkeep();
        }
    })
}

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_PROBES_TOTAL,
        "Total number of Unipile probes by outcome"
    );
    describe_histogram!(
        METRIC_PROBE_LATENCY,
        "Unipile probe latency in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Record the outcome and latency of a probe.
pub fn record_probe(start: Instant, outcome: ProbeOutcome) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_PROBE_LATENCY, "outcome" => outcome.as_str()).record(latency_ms);
    counter!(METRIC_PROBES_TOTAL, "outcome" => outcome.as_str()).increment(1);
}
