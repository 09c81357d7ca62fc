//! Router configuration.

use crate::{
    error::AppError,
    handlers::{health_check, list_users, render_metrics, summary},
    middleware::{correlation_id_layer, matrix_params_layer},
    state::AppState,
};
use axum::{http::Uri, routing::get, Router};
use tower::Layer;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Routes:
/// - `GET /todos`: enriched users for the requested mode
/// - `GET /todos/summary`: totals for the requested mode
/// - `GET /health`: liveness
/// - `GET /metrics`: Prometheus text, when metrics are enabled
///
/// Matrix parameters are stripped before routing, so `/todos;mode=USERID`
/// reaches the `/todos` handler.
pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/todos", get(list_users))
        .route("/todos/summary", get(summary))
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer());

    Router::new().fallback_service(matrix_params_layer().layer(routes))
}

#[allow(clippy::unused_async)]
async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("No route for {}", uri.path()))
}
