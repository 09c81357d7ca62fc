//! # Todo Fanout Runtime
//!
//! Executes the grouped parallel enrichment pipeline.
//!
//! ## Components
//!
//! - [`WorkerPool`]: fixed-width pool shared by every run; at most `W`
//!   enrichment units execute at once
//! - [`UserEnricher`]: one profile lookup per user, todos attached in memory
//! - [`GroupedPipeline`]: partitions todos, dispatches units, enforces the
//!   barrier between top-level groups
//! - [`TodoService`]: owns the pool and exposes `list_users_by_mode` and
//!   `summary_by_mode`
//! - [`observer`]: start/finish hooks (tracing, metrics)
//! - [`metrics`]: Prometheus recorder and metric helpers
//!
//! ## Data Flow
//!
//! ```text
//! TodoSource ──► todos ──► GroupedPipeline ──► Stream<User> ──► Vec<User>
//!                              │                          └───► OverallSummary
//!                              ▼
//!                 WorkerPool ──► UserEnricher ──► UserDirectory
//! ```

pub mod enricher;
pub mod metrics;
pub mod observer;
pub mod pipeline;
pub mod pool;
pub mod service;

pub use enricher::UserEnricher;
pub use observer::{CompositeObserver, MetricsObserver, PipelineObserver, TracingObserver};
pub use pipeline::{GroupedPipeline, UserStream};
pub use pool::{PoolConfig, WorkerPool};
pub use service::TodoService;
