//! Prometheus scrape endpoint.

use crate::{error::AppError, state::AppState};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

/// Render the installed recorder in Prometheus text format.
///
/// # Errors
///
/// Returns 404 when metrics are disabled or the recorder was installed by
/// someone else.
#[allow(clippy::unused_async)]
pub async fn render_metrics(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = state
        .metrics
        .as_ref()
        .and_then(|metrics| metrics.render())
        .ok_or_else(|| AppError::not_found("Metrics are disabled"))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}
