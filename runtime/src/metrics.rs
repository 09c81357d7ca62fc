//! Prometheus metrics for the fan-out pipeline.
//!
//! Covers whole pipeline runs (requests, failures, latency) and individual
//! enrichment units (count, failures, latency, pool occupancy).
//!
//! # Example
//!
//! ```rust,no_run
//! use todo_fanout_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut metrics = MetricsServer::new();
//! metrics.start()?;
//!
//! // Serve `metrics.render()` from an HTTP endpoint.
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

pub use metrics::{counter, gauge, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Owner of the installed Prometheus recorder.
///
/// The recorder is process-global. The HTTP layer renders it on demand.
#[derive(Default)]
pub struct MetricsServer {
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create an uninstalled metrics server.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Describe all metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed. A recorder
    /// that is already installed (e.g. by another test) is not an error; in
    /// that case [`render`](Self::render) returns `None`.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!(
                        "Metrics recorder already initialized, skipping re-initialization"
                    );
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if this server did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn register_metrics() {
    describe_counter!(
        "pipeline_requests_total",
        "Total number of pipeline runs, by operation and mode"
    );
    describe_counter!(
        "pipeline_failures_total",
        "Total number of pipeline runs that ended in an error"
    );
    describe_histogram!(
        "pipeline_duration_seconds",
        "Wall-clock time of a pipeline run"
    );

    describe_counter!(
        "enrichment_units_total",
        "Total number of user enrichment units completed"
    );
    describe_counter!(
        "enrichment_failures_total",
        "Total number of user enrichment units that failed"
    );
    describe_histogram!(
        "enrichment_duration_seconds",
        "Time taken to fetch a profile and attach todos"
    );
    describe_gauge!(
        "worker_pool_in_flight",
        "Enrichment units currently holding a worker pool permit"
    );
}

/// Pipeline run metrics recorder.
pub struct PipelineMetrics;

impl PipelineMetrics {
    /// Record a finished run.
    pub fn record_run(operation: &'static str, mode: &'static str, duration: Duration, ok: bool) {
        counter!("pipeline_requests_total", "operation" => operation, "mode" => mode).increment(1);
        histogram!("pipeline_duration_seconds", "operation" => operation, "mode" => mode)
            .record(duration.as_secs_f64());
        if !ok {
            counter!("pipeline_failures_total", "operation" => operation, "mode" => mode)
                .increment(1);
        }
    }
}

/// Enrichment unit metrics recorder.
pub struct EnrichmentMetrics;

impl EnrichmentMetrics {
    /// Record a successful enrichment.
    pub fn record_success(duration: Duration) {
        counter!("enrichment_units_total").increment(1);
        histogram!("enrichment_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a failed enrichment.
    pub fn record_failure() {
        counter!("enrichment_failures_total").increment(1);
    }

    /// Count one unit as holding a pool permit until the guard is dropped.
    ///
    /// The gauge is lowered on every exit path, including abort and panic.
    pub fn track_in_flight() -> InFlightGuard {
        gauge!("worker_pool_in_flight").increment(1.0);
        InFlightGuard { _private: () }
    }
}

/// Keeps `worker_pool_in_flight` raised while alive.
#[must_use = "the unit stops counting as in flight when the guard is dropped"]
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!("worker_pool_in_flight").decrement(1.0);
    }
}
