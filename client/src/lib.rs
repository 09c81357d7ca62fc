//! # Todo Fanout Client
//!
//! HTTP collaborators for the todo fan-out pipeline.
//!
//! [`HttpTodoClient`] implements both [`TodoSource`](todo_fanout_core::TodoSource)
//! and [`UserDirectory`](todo_fanout_core::UserDirectory) against a
//! JSONPlaceholder-style REST API:
//!
//! | Call | Request | Failure mapping |
//! |------|---------|-----------------|
//! | `retrieve_all_todos` | `GET {base}/todos` | non-2xx → `Status` |
//! | `find_user` | `GET {base}/users/{id}` | 404 → `NotFound`, other non-2xx → `Status` |
//!
//! Network failures and timeouts map to `SourceError::Transport`, malformed
//! bodies to `SourceError::Decode`.
//!
//! ## Example
//!
//! ```no_run
//! use todo_fanout_client::{HttpTodoClient, RemoteConfig};
//! use todo_fanout_core::TodoSource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpTodoClient::new(&RemoteConfig::default())?;
//! let todos = client.retrieve_all_todos().await?;
//! println!("{} todos", todos.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;

pub use client::{HttpTodoClient, RemoteConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::ClientError;
