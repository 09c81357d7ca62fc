//! Axum HTTP boundary for the todo fan-out pipeline.
//!
//! # Request Flow
//!
//! 1. **Matrix parameters** are stripped from the path (`/todos;mode=USERID`)
//! 2. **Correlation id** is read from `X-Correlation-ID` or generated
//! 3. **Mode** is extracted from `?mode=` or the matrix parameter
//! 4. **Service** runs the pipeline on the shared worker pool
//! 5. **Result** is rendered as JSON, errors as `{code, message}`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_fanout_core::{TodoSource, UserDirectory};
//! use todo_fanout_runtime::{PoolConfig, TodoService};
//! use todo_fanout_web::{build_router, AppState};
//!
//! # async fn example(
//! #     source: Arc<dyn TodoSource>,
//! #     directory: Arc<dyn UserDirectory>,
//! # ) -> std::io::Result<()> {
//! let service = TodoService::new(source, directory, &PoolConfig::default());
//! let app = build_router(AppState::new(service));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::RequestedMode;
pub use middleware::{correlation_id_layer, CorrelationId, MatrixParams, CORRELATION_ID_HEADER};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
