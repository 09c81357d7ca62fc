//! Bounded worker pool for enrichment units.
//!
//! The pool is a semaphore of `width` permits shared by every pipeline run.
//! Each unit is spawned as a tokio task that holds one permit while it runs,
//! so at most `width` units execute at any instant regardless of how many
//! requests are in flight.
//!
//! Units are spawned into a caller-owned [`JoinSet`]. Draining the set is the
//! barrier between top-level groups; dropping it aborts every unit that has
//! not finished, including those still waiting for a permit.
//!
//! ```
//! use todo_fanout_runtime::pool::{PoolConfig, WorkerPool};
//! use tokio::task::JoinSet;
//!
//! # async fn example() -> todo_fanout_core::Result<()> {
//! let pool = WorkerPool::new(&PoolConfig::default());
//! let mut units = JoinSet::new();
//!
//! pool.spawn_on(&mut units, async { Ok(21 * 2) })?;
//! while let Some(done) = units.join_next().await {
//!     assert_eq!(done.ok().and_then(Result::ok), Some(42));
//! }
//! # Ok(())
//! # }
//! ```

use crate::metrics::EnrichmentMetrics;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use todo_fanout_core::{PipelineError, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Default pool width.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Default worker name prefix.
pub const DEFAULT_POOL_PREFIX: &str = "todo-worker";

/// Worker pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum concurrent enrichment units (values below 1 are treated as 1)
    pub size: usize,
    /// Prefix for worker labels in tracing spans
    pub prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_POOL_SIZE,
            prefix: DEFAULT_POOL_PREFIX.to_string(),
        }
    }
}

impl PoolConfig {
    /// Config with the given width and the default prefix.
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// Fixed-width pool of enrichment workers.
#[derive(Debug)]
pub struct WorkerPool {
    prefix: String,
    width: usize,
    permits: Arc<Semaphore>,
    dispatched: AtomicU64,
}

impl WorkerPool {
    /// Create a pool from configuration.
    #[must_use]
    pub fn new(config: &PoolConfig) -> Self {
        let width = config.size.max(1);
        Self {
            prefix: config.prefix.clone(),
            width,
            permits: Arc::new(Semaphore::new(width)),
            dispatched: AtomicU64::new(0),
        }
    }

    /// Configured width `W`.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Worker label prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Units currently holding a permit.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.width.saturating_sub(self.permits.available_permits())
    }

    /// Total units dispatched since the pool was created.
    #[must_use]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Stop accepting work.
    ///
    /// Units already running finish normally. Units still waiting for a
    /// permit fail with [`PipelineError::PoolClosed`], as does any later
    /// [`spawn_on`](Self::spawn_on).
    pub fn close(&self) {
        if !self.permits.is_closed() {
            tracing::info!(pool = %self.prefix, "Closing worker pool");
            self.permits.close();
        }
    }

    /// Spawn `unit` into `set`, gated by a pool permit.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::PoolClosed`] if the pool has been closed.
    pub fn spawn_on<T, F>(&self, set: &mut JoinSet<Result<T>>, unit: F) -> Result<()>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        if self.is_closed() {
            return Err(PipelineError::PoolClosed);
        }

        let seq = self.dispatched.fetch_add(1, Ordering::Relaxed);
        let worker = format!("{}-{}", self.prefix, seq % self.width as u64 + 1);
        let permits = Arc::clone(&self.permits);

        set.spawn(
            async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| PipelineError::PoolClosed)?;
                let _in_flight = EnrichmentMetrics::track_in_flight();

                unit.await
            }
            .instrument(tracing::debug_span!("worker", worker = %worker)),
        );

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn test_width_is_at_least_one() {
        let pool = WorkerPool::new(&PoolConfig::with_size(0));
        assert_eq!(pool.width(), 1);
        assert_eq!(pool.prefix(), DEFAULT_POOL_PREFIX);
    }

    #[tokio::test]
    async fn test_pool_limits_concurrency() {
        let pool = WorkerPool::new(&PoolConfig::with_size(2));
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut set = JoinSet::new();

        for _ in 0..8 {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            pool.spawn_on(&mut set, async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        }

        while let Some(done) = set.join_next().await {
            done.unwrap().unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 2);
        assert_eq!(pool.dispatched(), 8);
        assert_eq!(pool.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_closed_pool_rejects_work() {
        let pool = WorkerPool::new(&PoolConfig::default());
        pool.close();
        assert!(pool.is_closed());

        let mut set: JoinSet<Result<()>> = JoinSet::new();
        let err = pool.spawn_on(&mut set, async { Ok(()) }).unwrap_err();
        assert!(matches!(err, PipelineError::PoolClosed));
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_waiting_units_fail_when_pool_closes() {
        let pool = WorkerPool::new(&PoolConfig::with_size(1));
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let mut set = JoinSet::new();

        pool.spawn_on(&mut set, async move {
            let _ = release_rx.await;
            Ok(1)
        })
        .unwrap();
        pool.spawn_on(&mut set, async { Ok(2) }).unwrap();

        // Let the first unit take the only permit.
        tokio::time::sleep(Duration::from_millis(20)).await;
        pool.close();
        release_tx.send(()).unwrap();

        let mut results = Vec::new();
        while let Some(done) = set.join_next().await {
            results.push(done.unwrap());
        }

        assert!(results.iter().any(|r| matches!(r, Ok(1))));
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(PipelineError::PoolClosed))));
    }

    #[tokio::test]
    async fn test_dropping_join_set_aborts_units() {
        let pool = WorkerPool::new(&PoolConfig::with_size(1));
        let finished = Arc::new(AtomicUsize::new(0));
        let mut set = JoinSet::new();

        for _ in 0..3 {
            let finished = Arc::clone(&finished);
            pool.spawn_on(&mut set, async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(set);
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(finished.load(Ordering::SeqCst), 0);
        assert_eq!(pool.in_flight(), 0);
    }
}
