//! Application state for Axum handlers.

use std::sync::Arc;
use todo_fanout_runtime::{metrics::MetricsServer, TodoService};

/// State shared across all HTTP handlers.
///
/// Cloning is cheap: the service and the metrics server are shared.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline orchestrator
    pub service: TodoService,
    /// Installed Prometheus recorder, if metrics are enabled
    pub metrics: Option<Arc<MetricsServer>>,
}

impl AppState {
    /// Create state without a metrics endpoint.
    #[must_use]
    pub const fn new(service: TodoService) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    /// Expose `metrics` through `GET /metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsServer>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}
