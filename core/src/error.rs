//! Error types for collaborators and the pipeline.

use crate::model::UserId;
use thiserror::Error;

/// Failure reported by a remote collaborator ([`TodoSource`](crate::TodoSource)
/// or [`UserDirectory`](crate::UserDirectory)).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The requested user does not exist.
    #[error("User {user_id} not found")]
    NotFound {
        /// The id that was looked up.
        user_id: UserId,
    },

    /// The request never produced a response (connect, DNS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote answered with an unexpected status.
    #[error("Remote returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Errors surfaced by the pipeline operations.
///
/// Every failure aborts the whole invocation: no partial user list or summary
/// is ever returned alongside an error.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The requested mode name is not one of the supported modes.
    ///
    /// Raised while parsing, before any remote call is made.
    #[error("Unsupported mode [{0}]")]
    UnsupportedMode(String),

    /// The todo source failed.
    #[error("Failed to retrieve todos: {0}")]
    TodoFetch(#[source] SourceError),

    /// A profile lookup failed, which fails the whole group it belongs to.
    #[error("Enrichment of user {user_id} in group {group} failed: {source}")]
    Enrichment {
        /// Display form of the top-level group key
        group: String,
        /// User whose profile lookup failed
        user_id: UserId,
        /// Underlying collaborator error
        #[source]
        source: SourceError,
    },

    /// An enrichment task panicked or was aborted.
    #[error("Worker failure: {0}")]
    Worker(String),

    /// The worker pool has been shut down.
    #[error("Worker pool is closed")]
    PoolClosed,
}

impl PipelineError {
    /// True when the failure originates from a remote collaborator.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::TodoFetch(_) | Self::Enrichment { .. })
    }

    /// The collaborator error behind this failure, if any.
    #[must_use]
    pub const fn source_error(&self) -> Option<&SourceError> {
        match self {
            Self::TodoFetch(source) | Self::Enrichment { source, .. } => Some(source),
            Self::UnsupportedMode(_) | Self::Worker(_) | Self::PoolClosed => None,
        }
    }
}
