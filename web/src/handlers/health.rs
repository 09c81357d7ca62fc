//! Health check endpoint.
//!
//! Liveness only: remote collaborators are not probed.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok`, or `shutting_down` once the worker pool is closed
    pub status: String,
    /// Service version
    pub version: String,
    /// Worker pool width
    pub pool_width: usize,
    /// Enrichment units currently holding a worker
    pub in_flight: usize,
}

/// Health check endpoint.
///
/// Returns 200 while the worker pool accepts work and 503 after shutdown.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"ok","version":"0.1.0","poolWidth":4,"inFlight":0}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let pool = state.service.pool();
    let (status, label) = if pool.is_closed() {
        (StatusCode::SERVICE_UNAVAILABLE, "shutting_down")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            pool_width: pool.width(),
            in_flight: pool.in_flight(),
        }),
    )
}
