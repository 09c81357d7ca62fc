//! Start/finish hooks around pipeline runs.
//!
//! [`TodoService`](crate::TodoService) calls the installed observer once when
//! an operation starts and once when it finishes, with the elapsed time and
//! the outcome. Timing and logging live here rather than in the pipeline.

use crate::metrics::PipelineMetrics;
use std::sync::Arc;
use std::time::Duration;
use todo_fanout_core::{OverallSummary, PipelineError, RetrievalMode};

/// Public operation being observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `list_users_by_mode`
    ListUsers,
    /// `summary_by_mode`
    Summary,
}

impl Operation {
    /// Metric/log label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListUsers => "list_users",
            Self::Summary => "summary",
        }
    }
}

/// How an observed run ended.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// A user list of the given length was produced.
    Users(usize),
    /// A summary was produced.
    Summary(&'a OverallSummary),
    /// The run failed.
    Failed(&'a PipelineError),
}

impl Outcome<'_> {
    /// True unless the run failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Hook invoked around every public pipeline operation.
pub trait PipelineObserver: Send + Sync {
    /// Called before any remote call is made.
    fn on_start(&self, _operation: Operation, _mode: RetrievalMode) {}

    /// Called once the operation has a result.
    fn on_finish(
        &self,
        _operation: Operation,
        _mode: RetrievalMode,
        _elapsed: Duration,
        _outcome: Outcome<'_>,
    ) {
    }
}

/// Logs `BEGIN`/`END` lines with the elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_start(&self, operation: Operation, mode: RetrievalMode) {
        tracing::info!(operation = operation.as_str(), %mode, "BEGIN");
    }

    fn on_finish(
        &self,
        operation: Operation,
        mode: RetrievalMode,
        elapsed: Duration,
        outcome: Outcome<'_>,
    ) {
        let elapsed_ms = elapsed.as_millis();
        match outcome {
            Outcome::Users(count) => tracing::info!(
                operation = operation.as_str(),
                %mode,
                elapsed_ms,
                users = count,
                "END"
            ),
            Outcome::Summary(summary) => tracing::info!(
                operation = operation.as_str(),
                %mode,
                elapsed_ms,
                user_count = summary.user_count,
                todo_count = summary.todo_count,
                "END"
            ),
            Outcome::Failed(error) => tracing::error!(
                operation = operation.as_str(),
                %mode,
                elapsed_ms,
                %error,
                "FAILED"
            ),
        }
    }
}

/// Records run counts and latency through [`PipelineMetrics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObserver;

impl PipelineObserver for MetricsObserver {
    fn on_finish(
        &self,
        operation: Operation,
        mode: RetrievalMode,
        elapsed: Duration,
        outcome: Outcome<'_>,
    ) {
        PipelineMetrics::record_run(
            operation.as_str(),
            mode.as_str(),
            elapsed,
            outcome.is_success(),
        );
    }
}

/// Fans every hook out to several observers, in order.
#[derive(Clone, Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create an empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer.
    #[must_use]
    pub fn with(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_start(&self, operation: Operation, mode: RetrievalMode) {
        for observer in &self.observers {
            observer.on_start(operation, mode);
        }
    }

    fn on_finish(
        &self,
        operation: Operation,
        mode: RetrievalMode,
        elapsed: Duration,
        outcome: Outcome<'_>,
    ) {
        for observer in &self.observers {
            observer.on_finish(operation, mode, elapsed, outcome);
        }
    }
}
