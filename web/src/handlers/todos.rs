//! Todo endpoints.
//!
//! ```text
//! GET /todos[;mode=M][?mode=M]          → [User]
//! GET /todos/summary[;mode=M][?mode=M]  → OverallSummary
//! ```
//!
//! Request timing and BEGIN/END logging happen in the service observer.

use crate::{extractors::RequestedMode, state::AppState, WebResult};
use axum::{extract::State, Json};
use todo_fanout_core::{OverallSummary, User};

/// Enriched users, grouped by owner.
///
/// # Errors
///
/// Returns 400 for an unsupported mode, 502 when a remote call fails and
/// 503 after shutdown.
pub async fn list_users(
    State(state): State<AppState>,
    RequestedMode(mode): RequestedMode,
) -> WebResult<Json<Vec<User>>> {
    let users = state.service.list_users_by_mode(mode).await?;
    Ok(Json(users))
}

/// User and todo totals.
///
/// # Errors
///
/// Same as [`list_users`].
pub async fn summary(
    State(state): State<AppState>,
    RequestedMode(mode): RequestedMode,
) -> WebResult<Json<OverallSummary>> {
    let summary = state.service.summary_by_mode(mode).await?;
    Ok(Json(summary))
}
