//! Integration tests for `TodoService` over in-memory collaborators.
//!
//! Cover both retrieval modes end to end: partitioning, group ordering, the
//! barrier between parity groups, the pool width, failure propagation and
//! cancellation.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use futures::StreamExt;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todo_fanout_core::{
    OverallSummary, Parity, PipelineError, RetrievalMode, SourceError, SourceFuture, Todo, User,
    UserDirectory, UserId,
};
use todo_fanout_runtime::observer::{Operation, Outcome};
use todo_fanout_runtime::{PipelineObserver, PoolConfig, TodoService};
use todo_fanout_testing::{fixtures, InMemoryTodoSource, InMemoryUserDirectory, LookupEvent};

fn service_with(
    todos: Vec<Todo>,
    directory: &InMemoryUserDirectory,
    width: usize,
) -> (TodoService, InMemoryTodoSource) {
    let source = InMemoryTodoSource::new(todos);
    let service = TodoService::new(
        Arc::new(source.clone()),
        Arc::new(directory.clone()),
        &PoolConfig::with_size(width),
    );
    (service, source)
}

/// `(user id, todo ids)` pairs, keyed for order-insensitive comparison.
fn content(users: &[User]) -> BTreeMap<UserId, Vec<i64>> {
    users
        .iter()
        .map(|u| (u.id, u.todos.iter().map(|t| t.id).collect()))
        .collect()
}

#[tokio::test]
async fn test_user_id_scenario() {
    let directory = InMemoryUserDirectory::permissive();
    let (service, _) = service_with(fixtures::scenario_todos(), &directory, 4);

    let users = service.list_users_by_mode(RetrievalMode::UserId).await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(
        content(&users),
        BTreeMap::from([(1, vec![1, 3]), (2, vec![2])])
    );

    let summary = service.summary_by_mode(RetrievalMode::UserId).await.unwrap();
    assert_eq!(
        summary,
        OverallSummary {
            user_count: 2,
            todo_count: 3,
        }
    );
}

#[tokio::test]
async fn test_even_odd_scenario_emits_even_first() {
    // Make the even user slow so completion order alone would put it last.
    let directory =
        InMemoryUserDirectory::permissive().with_user_delay(2, Duration::from_millis(50));
    let (service, _) = service_with(fixtures::scenario_todos(), &directory, 4);

    let users = service.list_users_by_mode(RetrievalMode::EvenOdd).await.unwrap();

    assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2, 1]);
    assert_eq!(users[1].todos.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);
}

#[tokio::test]
async fn test_even_odd_barrier_between_groups() {
    let directory = InMemoryUserDirectory::permissive()
        .with_delay(Duration::from_millis(5))
        .with_user_delay(4, Duration::from_millis(60));
    let (service, _) = service_with(fixtures::sample_todos(7, 2), &directory, 8);

    let users = service.list_users_by_mode(RetrievalMode::EvenOdd).await.unwrap();
    assert_eq!(users.len(), 7);

    let events = directory.events();
    let last_even_finish = events
        .iter()
        .rposition(|e| matches!(e, LookupEvent::Finished(id) if id % 2 == 0))
        .unwrap();
    let first_odd_start = events
        .iter()
        .position(|e| matches!(e, LookupEvent::Started(id) if id % 2 != 0))
        .unwrap();
    assert!(
        last_even_finish < first_odd_start,
        "odd lookups started before the even group drained: {events:?}"
    );

    let split = users.iter().position(|u| u.id % 2 != 0).unwrap();
    assert!(users[..split].iter().all(|u| Parity::of(u.id) == Parity::Even));
    assert!(users[split..].iter().all(|u| Parity::of(u.id) == Parity::Odd));
}

#[tokio::test]
async fn test_user_id_mode_emits_in_completion_order() {
    let directory =
        InMemoryUserDirectory::permissive().with_user_delay(1, Duration::from_millis(60));
    let (service, _) = service_with(fixtures::scenario_todos(), &directory, 4);

    let users = service.list_users_by_mode(RetrievalMode::UserId).await.unwrap();

    // User 1 is encountered first but finishes last; flat mode does not re-sort.
    assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2, 1]);
}

#[tokio::test]
async fn test_pool_width_bounds_concurrency() {
    for mode in RetrievalMode::ALL {
        let directory = InMemoryUserDirectory::permissive().with_delay(Duration::from_millis(15));
        let (service, _) = service_with(fixtures::sample_todos(12, 1), &directory, 3);

        let users = service.list_users_by_mode(mode).await.unwrap();

        assert_eq!(users.len(), 12);
        assert!(directory.peak_concurrency() <= 3, "mode {mode}");
        assert!(directory.peak_concurrency() >= 2, "mode {mode}");
    }
}

#[tokio::test]
async fn test_pool_is_shared_across_concurrent_requests() {
    let directory = InMemoryUserDirectory::permissive().with_delay(Duration::from_millis(15));
    let (service, _) = service_with(fixtures::sample_todos(6, 1), &directory, 2);

    let (a, b) = tokio::join!(
        service.list_users_by_mode(RetrievalMode::UserId),
        service.summary_by_mode(RetrievalMode::EvenOdd)
    );

    assert_eq!(a.unwrap().len(), 6);
    assert_eq!(b.unwrap().user_count, 6);
    assert!(directory.peak_concurrency() <= 2);
    assert_eq!(service.pool().dispatched(), 12);
}

#[tokio::test]
async fn test_profile_failure_fails_whole_run() {
    for mode in RetrievalMode::ALL {
        let directory = InMemoryUserDirectory::permissive()
            .fail_for(3, SourceError::NotFound { user_id: 3 });
        let (service, _) = service_with(fixtures::sample_todos(5, 2), &directory, 2);

        match service.list_users_by_mode(mode).await {
            Err(PipelineError::Enrichment { user_id, source, .. }) => {
                assert_eq!(user_id, 3);
                assert_eq!(source, SourceError::NotFound { user_id: 3 });
            }
            other => panic!("expected enrichment failure in {mode}, got {other:?}"),
        }

        let err = service.summary_by_mode(mode).await.unwrap_err();
        assert!(err.is_remote());
    }
}

#[tokio::test]
async fn test_profile_failure_labels_group() {
    let directory =
        InMemoryUserDirectory::permissive().fail_for(2, SourceError::Transport("reset".into()));
    let (service, _) = service_with(fixtures::scenario_todos(), &directory, 2);

    let err = service.list_users_by_mode(RetrievalMode::EvenOdd).await.unwrap_err();
    assert!(matches!(err, PipelineError::Enrichment { ref group, .. } if group == "EVEN"));

    // The odd group is never dispatched once the even group failed.
    assert!(!directory.lookups().contains(&1));
}

#[tokio::test]
async fn test_todo_source_failure_is_fatal() {
    let directory = InMemoryUserDirectory::permissive();
    let service = TodoService::new(
        Arc::new(InMemoryTodoSource::failing(SourceError::Transport("refused".into()))),
        Arc::new(directory.clone()),
        &PoolConfig::default(),
    );

    let err = service.list_users_by_mode(RetrievalMode::EvenOdd).await.unwrap_err();
    assert!(matches!(err, PipelineError::TodoFetch(SourceError::Transport(_))));
    assert!(directory.lookups().is_empty());
}

#[tokio::test]
async fn test_empty_input() {
    for mode in RetrievalMode::ALL {
        let directory = InMemoryUserDirectory::permissive();
        let (service, source) = service_with(Vec::new(), &directory, 4);

        assert!(service.list_users_by_mode(mode).await.unwrap().is_empty());
        assert_eq!(
            service.summary_by_mode(mode).await.unwrap(),
            OverallSummary::default()
        );
        assert_eq!(source.calls(), 2);
        assert!(directory.lookups().is_empty());
    }
}

#[tokio::test]
async fn test_repeated_runs_yield_same_content() {
    let directory = InMemoryUserDirectory::permissive().with_delay(Duration::from_millis(2));
    let (service, _) = service_with(fixtures::sample_todos(9, 3), &directory, 4);

    for mode in RetrievalMode::ALL {
        let first = service.list_users_by_mode(mode).await.unwrap();
        let second = service.list_users_by_mode(mode).await.unwrap();
        assert_eq!(content(&first), content(&second));
    }
}

#[tokio::test]
async fn test_dropping_stream_cancels_outstanding_units() {
    let directory = InMemoryUserDirectory::permissive().with_delay(Duration::from_millis(40));
    let (service, _) = service_with(fixtures::sample_todos(4, 1), &directory, 1);

    let mut users = service.stream_users_by_mode(RetrievalMode::UserId);
    let first = users.next().await.unwrap().unwrap();
    drop(users);

    tokio::time::sleep(Duration::from_millis(200)).await;

    let finished: Vec<_> = directory
        .events()
        .into_iter()
        .filter(|e| matches!(e, LookupEvent::Finished(_)))
        .collect();
    assert_eq!(finished, vec![LookupEvent::Finished(first.id)]);
    assert!(directory.lookups().len() <= 2);
    assert_eq!(service.pool().in_flight(), 0);
}

#[tokio::test]
async fn test_stream_is_deferred_until_polled() {
    let directory = InMemoryUserDirectory::permissive();
    let (service, source) = service_with(fixtures::scenario_todos(), &directory, 2);

    let users = service.stream_users_by_mode(RetrievalMode::EvenOdd);
    assert_eq!(source.calls(), 0);

    let users: Vec<_> = users.collect().await;
    assert_eq!(users.len(), 2);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_shutdown_rejects_new_runs() {
    let directory = InMemoryUserDirectory::permissive();
    let (service, source) = service_with(fixtures::scenario_todos(), &directory, 2);

    service.shutdown();

    let err = service.summary_by_mode(RetrievalMode::UserId).await.unwrap_err();
    assert!(matches!(err, PipelineError::PoolClosed));
    assert_eq!(source.calls(), 0);
}

struct PanickingDirectory;

impl UserDirectory for PanickingDirectory {
    fn find_user(&self, user_id: UserId) -> SourceFuture<'_, User> {
        Box::pin(async move {
            if user_id == 2 {
                panic!("directory exploded");
            }
            Ok(User::new(user_id, "ok"))
        })
    }
}

#[tokio::test]
async fn test_panicking_unit_surfaces_worker_error() {
    let service = TodoService::new(
        Arc::new(InMemoryTodoSource::new(fixtures::scenario_todos())),
        Arc::new(PanickingDirectory),
        &PoolConfig::with_size(2),
    );

    let err = service.list_users_by_mode(RetrievalMode::UserId).await.unwrap_err();
    assert!(matches!(err, PipelineError::Worker(ref m) if m.contains("panicked")));
}

#[derive(Default)]
struct Recording {
    calls: Mutex<Vec<(Operation, RetrievalMode, bool)>>,
}

impl PipelineObserver for Recording {
    fn on_finish(
        &self,
        operation: Operation,
        mode: RetrievalMode,
        _elapsed: Duration,
        outcome: Outcome<'_>,
    ) {
        self.calls
            .lock()
            .unwrap()
            .push((operation, mode, outcome.is_success()));
    }
}

#[tokio::test]
async fn test_observer_sees_every_operation() {
    let recording = Arc::new(Recording::default());
    let directory =
        InMemoryUserDirectory::permissive().fail_for(1, SourceError::NotFound { user_id: 1 });
    let (service, _) = service_with(fixtures::scenario_todos(), &directory, 2);
    let service = service.with_observer(recording.clone());

    let _ = service.list_users_by_mode(RetrievalMode::UserId).await;
    let _ = service.summary_by_mode(RetrievalMode::EvenOdd).await;

    assert_eq!(
        *recording.calls.lock().unwrap(),
        vec![
            (Operation::ListUsers, RetrievalMode::UserId, false),
            (Operation::Summary, RetrievalMode::EvenOdd, false),
        ]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_partition_and_summary_are_consistent(
        todos in fixtures::arb_todos(12, 48),
        width in 1usize..5,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        for mode in RetrievalMode::ALL {
            let directory = InMemoryUserDirectory::permissive();
            let (service, _) = service_with(todos.clone(), &directory, width);

            let (users, summary) = runtime.block_on(async {
                (
                    service.list_users_by_mode(mode).await.unwrap(),
                    service.summary_by_mode(mode).await.unwrap(),
                )
            });

            // Every todo appears exactly once, under its owner.
            let mut emitted: Vec<Todo> = users.iter().flat_map(|u| u.todos.clone()).collect();
            emitted.sort_by_key(|t| t.id);
            prop_assert_eq!(&emitted, &todos);
            prop_assert!(users.iter().all(|u| u.todos.iter().all(|t| t.user_id == u.id)));

            // One user per distinct owner.
            let mut ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), users.len());

            prop_assert_eq!(summary.user_count, users.len() as u64);
            prop_assert_eq!(
                summary.todo_count,
                users.iter().map(|u| u.todos.len() as u64).sum::<u64>()
            );

            if mode == RetrievalMode::EvenOdd {
                let first_odd = users.iter().position(|u| u.id % 2 != 0).unwrap_or(users.len());
                prop_assert!(users[first_odd..].iter().all(|u| u.id % 2 != 0));
            }
        }
    }
}
