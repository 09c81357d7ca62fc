//! Todo fan-out HTTP server.
//!
//! Wires the remote client, the pipeline service and the router together
//! from a [`Config`](config::Config).

pub mod config;

use anyhow::Context;
use config::Config;
use std::sync::Arc;
use todo_fanout_client::HttpTodoClient;
use todo_fanout_runtime::{
    metrics::MetricsServer, CompositeObserver, MetricsObserver, TodoService, TracingObserver,
};
use todo_fanout_web::AppState;

/// Build the pipeline service and HTTP state described by `config`.
///
/// With metrics enabled the Prometheus recorder is installed and the service
/// reports run metrics in addition to BEGIN/END logs.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the metrics
/// recorder cannot be installed.
pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let client =
        Arc::new(HttpTodoClient::new(&config.remote).context("Failed to create HTTP client")?);
    tracing::info!(base_url = client.base_url(), "Remote client configured");

    let service = TodoService::new(client.clone(), client, &config.pool);

    if !config.metrics_enabled {
        return Ok(AppState::new(service));
    }

    let mut metrics = MetricsServer::new();
    metrics.start().context("Failed to start metrics")?;

    let observer = CompositeObserver::new()
        .with(Arc::new(TracingObserver))
        .with(Arc::new(MetricsObserver));
    let service = service.with_observer(Arc::new(observer));

    Ok(AppState::new(service).with_metrics(Arc::new(metrics)))
}
