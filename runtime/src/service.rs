//! The pipeline orchestrator.

use crate::enricher::UserEnricher;
use crate::observer::{Operation, Outcome, PipelineObserver, TracingObserver};
use crate::pipeline::{GroupedPipeline, UserStream};
use crate::pool::{PoolConfig, WorkerPool};
use async_stream::stream;
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use todo_fanout_core::{
    try_summarize, OverallSummary, PipelineError, Result, RetrievalMode, TodoSource, User,
    UserDirectory,
};

/// Entry point for the two public operations.
///
/// Owns the worker pool for its whole lifetime; build one service at startup
/// and share it (it is cheap to clone).
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todo_fanout_core::{RetrievalMode, TodoSource, UserDirectory};
/// use todo_fanout_runtime::{PoolConfig, TodoService};
///
/// # async fn example(
/// #     source: Arc<dyn TodoSource>,
/// #     directory: Arc<dyn UserDirectory>,
/// # ) -> todo_fanout_core::Result<()> {
/// let service = TodoService::new(source, directory, &PoolConfig::with_size(8));
///
/// let users = service.list_users_by_mode(RetrievalMode::EvenOdd).await?;
/// let summary = service.summary_by_mode(RetrievalMode::EvenOdd).await?;
/// assert_eq!(summary.user_count, users.len() as u64);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TodoService {
    source: Arc<dyn TodoSource>,
    pipeline: GroupedPipeline,
    observer: Arc<dyn PipelineObserver>,
}

impl TodoService {
    /// Create a service with a fresh worker pool built from `pool`.
    ///
    /// The default observer is [`TracingObserver`].
    #[must_use]
    pub fn new(
        source: Arc<dyn TodoSource>,
        directory: Arc<dyn UserDirectory>,
        pool: &PoolConfig,
    ) -> Self {
        let pool = Arc::new(WorkerPool::new(pool));
        tracing::info!(pool = pool.prefix(), width = pool.width(), "Worker pool created");

        Self {
            source,
            pipeline: GroupedPipeline::new(pool, UserEnricher::new(directory)),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The worker pool shared by every run of this service.
    #[must_use]
    pub fn pool(&self) -> &WorkerPool {
        self.pipeline.pool()
    }

    /// Stream enriched users for `mode`.
    ///
    /// Execution is deferred: the todo source is queried on first poll.
    /// Dropping the stream cancels the run. Observers are not notified; use
    /// [`list_users_by_mode`](Self::list_users_by_mode) for an observed run.
    #[must_use]
    pub fn stream_users_by_mode(&self, mode: RetrievalMode) -> UserStream {
        let source = Arc::clone(&self.source);
        let pipeline = self.pipeline.clone();

        Box::pin(stream! {
            if pipeline.pool().is_closed() {
                yield Err(PipelineError::PoolClosed);
                return;
            }

            let todos = match source.retrieve_all_todos().await {
                Ok(todos) => todos,
                Err(e) => {
                    tracing::warn!(%mode, error = %e, "Todo retrieval failed");
                    yield Err(PipelineError::TodoFetch(e));
                    return;
                }
            };
            tracing::debug!(%mode, todos = todos.len(), "Todos retrieved");

            let mut users = pipeline.run(mode, todos);
            while let Some(user) = users.next().await {
                yield user;
            }
        })
    }

    /// Enrich every user for `mode` and return them in emission order.
    ///
    /// # Errors
    ///
    /// Returns the first [`PipelineError`] hit by the run; no partial list is
    /// returned.
    pub async fn list_users_by_mode(&self, mode: RetrievalMode) -> Result<Vec<User>> {
        let start = Instant::now();
        self.observer.on_start(Operation::ListUsers, mode);

        let result: Result<Vec<User>> = self.stream_users_by_mode(mode).try_collect().await;

        let outcome = match &result {
            Ok(users) => Outcome::Users(users.len()),
            Err(e) => Outcome::Failed(e),
        };
        self.observer
            .on_finish(Operation::ListUsers, mode, start.elapsed(), outcome);

        result
    }

    /// Fold the users of `mode` into an [`OverallSummary`].
    ///
    /// # Errors
    ///
    /// Returns the first [`PipelineError`] hit by the run.
    pub async fn summary_by_mode(&self, mode: RetrievalMode) -> Result<OverallSummary> {
        let start = Instant::now();
        self.observer.on_start(Operation::Summary, mode);

        let result = try_summarize(self.stream_users_by_mode(mode)).await;

        let outcome = match &result {
            Ok(summary) => Outcome::Summary(summary),
            Err(e) => Outcome::Failed(e),
        };
        self.observer
            .on_finish(Operation::Summary, mode, start.elapsed(), outcome);

        result
    }

    /// Close the worker pool. Later runs fail with [`PipelineError::PoolClosed`].
    pub fn shutdown(&self) {
        self.pool().close();
    }
}
