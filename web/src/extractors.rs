//! Custom Axum extractors.

use crate::error::AppError;
use crate::middleware::MatrixParams;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use todo_fanout_core::RetrievalMode;

/// Name of the query or matrix parameter selecting the retrieval mode.
pub const MODE_PARAM: &str = "mode";

/// Retrieval mode requested by the client.
///
/// Read from `?mode=` first, then from a `;mode=` matrix parameter. A missing
/// or empty value selects [`RetrievalMode::EvenOdd`]. An unknown name is
/// rejected with `400 UNSUPPORTED_MODE` before any work is done.
///
/// # Example
///
/// ```ignore
/// async fn handler(RequestedMode(mode): RequestedMode) -> String {
///     mode.to_string()
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedMode(pub RetrievalMode);

#[derive(Debug, Deserialize)]
struct ModeQuery {
    mode: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestedMode
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<ModeQuery>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        let raw = query.mode.filter(|m| !m.is_empty()).or_else(|| {
            parts
                .extensions
                .get::<MatrixParams>()
                .and_then(|params| params.get(MODE_PARAM))
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        });

        match raw {
            Some(name) => Ok(Self(name.parse()?)),
            None => Ok(Self(RetrievalMode::default())),
        }
    }
}
