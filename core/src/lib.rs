//! # Todo Fanout Core
//!
//! Domain types and pure building blocks for the todo fan-out pipeline.
//!
//! The pipeline retrieves a flat list of todos, partitions it by owning user
//! according to a [`RetrievalMode`], enriches every partition with the user's
//! profile and optionally folds the result into an [`OverallSummary`].
//!
//! This crate holds everything that does not perform I/O:
//!
//! - **Model**: [`Todo`], [`User`], [`OverallSummary`]
//! - **Modes**: [`RetrievalMode`] and its exhaustive dispatch
//! - **Grouping**: [`GroupKeyStrategy`] with [`ByUserId`] and [`ByParity`]
//! - **Summary**: the [`summarize`] left fold
//! - **Collaborators**: the [`TodoSource`] and [`UserDirectory`] traits that the
//!   runtime drives and that the HTTP client (or an in-memory mock) implements
//! - **Errors**: [`SourceError`] for collaborators, [`PipelineError`] for the
//!   pipeline itself
//!
//! ## Example
//!
//! ```
//! use todo_fanout_core::{partition, ByParity, Parity, Todo};
//!
//! let todos = vec![
//!     Todo::new(1, 1, "write docs", false),
//!     Todo::new(2, 2, "ship it", true),
//!     Todo::new(3, 1, "review", false),
//! ];
//!
//! let groups = partition(todos, &ByParity);
//! assert_eq!(groups[0].0, Parity::Odd); // encounter order, not key order
//! assert_eq!(groups[0].1.len(), 2);
//! ```

pub mod error;
pub mod grouping;
pub mod mode;
pub mod model;
pub mod source;
pub mod summary;

pub use error::{PipelineError, SourceError};
pub use grouping::{partition, ByParity, ByUserId, GroupKeyStrategy, Parity};
pub use mode::RetrievalMode;
pub use model::{OverallSummary, Todo, User, UserId};
pub use source::{SourceFuture, TodoSource, UserDirectory};
pub use summary::{summarize, try_summarize};

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
