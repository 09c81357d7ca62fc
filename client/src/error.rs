//! Error types for the HTTP client

use thiserror::Error;

/// Errors raised while setting up the HTTP client.
///
/// Request failures are reported per call as
/// [`SourceError`](todo_fanout_core::SourceError).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The reqwest client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}
