//! Grouped parallel enrichment.
//!
//! [`GroupedPipeline::run`] turns a todo list into a stream of enriched users
//! using the topology selected by the [`RetrievalMode`]:
//!
//! ```text
//! USER_ID   todos ─► partition by user ─► pool ─► users (completion order)
//!
//! EVEN_ODD  todos ─► partition by parity ─► sort (EVEN, ODD)
//!                      │
//!                      ├─ EVEN ─► partition by user ─► pool ─► drain ─┐
//!                      │                                              │ barrier
//!                      └─ ODD  ─► partition by user ─► pool ─► drain ◄┘
//! ```
//!
//! Inside one top-level group users are yielded as their units complete.
//! Flat mode is not re-sorted. In nested mode no unit of a later parity group
//! is dispatched before every unit of the earlier group has finished.
//!
//! The stream owns the in-flight [`JoinSet`]. Dropping the stream aborts the
//! units that are still running and dispatches nothing further. The first
//! failed unit ends the stream with that error and aborts the rest.

use crate::enricher::UserEnricher;
use crate::pool::WorkerPool;
use async_stream::stream;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use todo_fanout_core::{
    partition, ByParity, ByUserId, Parity, PipelineError, Result, RetrievalMode, Todo, User,
};
use tokio::task::{JoinError, JoinSet};

/// Stream of enriched users produced by a pipeline run.
pub type UserStream = Pin<Box<dyn Stream<Item = Result<User>> + Send>>;

/// The grouping and fan-out stage.
#[derive(Clone)]
pub struct GroupedPipeline {
    pool: Arc<WorkerPool>,
    enricher: UserEnricher,
}

impl GroupedPipeline {
    /// Create a pipeline dispatching `enricher` units onto `pool`.
    #[must_use]
    pub const fn new(pool: Arc<WorkerPool>, enricher: UserEnricher) -> Self {
        Self { pool, enricher }
    }

    /// The pool this pipeline dispatches onto.
    #[must_use]
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Run `todos` through the topology of `mode`.
    ///
    /// Nothing is dispatched until the stream is first polled.
    #[must_use]
    pub fn run(&self, mode: RetrievalMode, todos: Vec<Todo>) -> UserStream {
        match mode {
            RetrievalMode::UserId => self.flat(todos),
            RetrievalMode::EvenOdd => self.nested(todos),
        }
    }

    fn flat(&self, todos: Vec<Todo>) -> UserStream {
        let pipeline = self.clone();

        Box::pin(stream! {
            tracing::info!(todos = todos.len(), "Processing user groups");

            let mut units = match pipeline.dispatch(None, todos) {
                Ok(units) => units,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            while let Some(result) = next_completed(&mut units).await {
                match result {
                    Ok(user) => yield Ok(user),
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        })
    }

    fn nested(&self, todos: Vec<Todo>) -> UserStream {
        let pipeline = self.clone();

        Box::pin(stream! {
            let mut groups = partition(todos, &ByParity);
            groups.sort_by_key(|(parity, _)| *parity);

            for (parity, todos) in groups {
                tracing::info!(group = %parity, todos = todos.len(), "Processing group");

                let mut units = match pipeline.dispatch(Some(parity), todos) {
                    Ok(units) => units,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                // Drain fully before the next parity group is dispatched.
                while let Some(result) = next_completed(&mut units).await {
                    match result {
                        Ok(user) => yield Ok(user),
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }
        })
    }

    /// Partition `todos` by user and spawn one unit per user.
    ///
    /// `parent` is the enclosing parity group, if any; it only labels errors.
    fn dispatch(&self, parent: Option<Parity>, todos: Vec<Todo>) -> Result<JoinSet<Result<User>>> {
        let mut units = JoinSet::new();

        for (user_id, user_todos) in partition(todos, &ByUserId) {
            let enricher = self.enricher.clone();
            let group = parent.map_or_else(|| user_id.to_string(), |p| p.to_string());
            self.pool.spawn_on(&mut units, async move {
                enricher.enrich(&group, user_id, user_todos).await
            })?;
        }

        Ok(units)
    }
}

async fn next_completed(units: &mut JoinSet<Result<User>>) -> Option<Result<User>> {
    let joined = units.join_next().await?;
    Some(joined.map_err(worker_failure).and_then(std::convert::identity))
}

fn worker_failure(err: JoinError) -> PipelineError {
    if err.is_panic() {
        PipelineError::Worker(format!("enrichment unit panicked: {err}"))
    } else {
        PipelineError::Worker(format!("enrichment unit aborted: {err}"))
    }
}
