//! In-memory collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todo_fanout_core::{SourceError, SourceFuture, Todo, TodoSource, User, UserDirectory, UserId};

/// Todo source over a fixed list.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTodoSource {
    todos: Arc<Mutex<Vec<Todo>>>,
    failure: Arc<Mutex<Option<SourceError>>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryTodoSource {
    /// Source returning `todos` on every call.
    #[must_use]
    pub fn new(todos: Vec<Todo>) -> Self {
        Self {
            todos: Arc::new(Mutex::new(todos)),
            ..Self::default()
        }
    }

    /// Source failing every call with `error`.
    #[must_use]
    pub fn failing(error: SourceError) -> Self {
        let source = Self::default();
        *source.failure.lock().unwrap() = Some(error);
        source
    }

    /// Replace the todo list.
    pub fn set_todos(&self, todos: Vec<Todo>) {
        *self.todos.lock().unwrap() = todos;
    }

    /// Number of `retrieve_all_todos` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TodoSource for InMemoryTodoSource {
    fn retrieve_all_todos(&self) -> SourceFuture<'_, Vec<Todo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(self.todos.lock().unwrap().clone()),
        };
        Box::pin(async move { result })
    }
}

/// One entry of the directory's lookup log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupEvent {
    /// A lookup for this user began.
    Started(UserId),
    /// The lookup for this user returned (successfully or not).
    Finished(UserId),
}

#[derive(Debug, Default)]
struct DirectoryState {
    profiles: HashMap<UserId, User>,
    failures: HashMap<UserId, SourceError>,
    delays: HashMap<UserId, Duration>,
    log: Vec<LookupEvent>,
}

/// User directory backed by a map of profiles.
///
/// A *permissive* directory synthesizes a profile for any id it does not
/// know, which keeps property tests free of setup.
#[derive(Clone, Debug, Default)]
pub struct InMemoryUserDirectory {
    state: Arc<Mutex<DirectoryState>>,
    permissive: bool,
    default_delay: Duration,
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl InMemoryUserDirectory {
    /// Directory knowing exactly `users`.
    #[must_use]
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        let directory = Self::default();
        {
            let mut state = directory.state.lock().unwrap();
            for user in users {
                state.profiles.insert(user.id, user);
            }
        }
        directory
    }

    /// Directory answering every id with a generated profile.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// Delay applied to every lookup without a per-user delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Delay the lookup of `user_id`.
    #[must_use]
    pub fn with_user_delay(self, user_id: UserId, delay: Duration) -> Self {
        self.state.lock().unwrap().delays.insert(user_id, delay);
        self
    }

    /// Fail the lookup of `user_id` with `error`.
    #[must_use]
    pub fn fail_for(self, user_id: UserId, error: SourceError) -> Self {
        self.state.lock().unwrap().failures.insert(user_id, error);
        self
    }

    /// Every started/finished event, in the order they happened.
    #[must_use]
    pub fn events(&self) -> Vec<LookupEvent> {
        self.state.lock().unwrap().log.clone()
    }

    /// Ids looked up, in start order.
    #[must_use]
    pub fn lookups(&self) -> Vec<UserId> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                LookupEvent::Started(id) => Some(id),
                LookupEvent::Finished(_) => None,
            })
            .collect()
    }

    /// Distinct ids looked up.
    #[must_use]
    pub fn distinct_lookups(&self) -> HashSet<UserId> {
        self.lookups().into_iter().collect()
    }

    /// Highest number of lookups that were in progress at the same time.
    #[must_use]
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn resolve(&self, user_id: UserId) -> (Result<User, SourceError>, Duration) {
        let state = self.state.lock().unwrap();
        let delay = state
            .delays
            .get(&user_id)
            .copied()
            .unwrap_or(self.default_delay);

        let result = if let Some(error) = state.failures.get(&user_id) {
            Err(error.clone())
        } else if let Some(profile) = state.profiles.get(&user_id) {
            Ok(profile.clone())
        } else if self.permissive {
            Ok(User::new(user_id, format!("User {user_id}")))
        } else {
            Err(SourceError::NotFound { user_id })
        };

        (result, delay)
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_user(&self, user_id: UserId) -> SourceFuture<'_, User> {
        Box::pin(async move {
            self.state
                .lock()
                .unwrap()
                .log
                .push(LookupEvent::Started(user_id));
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let (result, delay) = self.resolve(user_id);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            self.current.fetch_sub(1, Ordering::SeqCst);
            self.state
                .lock()
                .unwrap()
                .log
                .push(LookupEvent::Finished(user_id));
            result
        })
    }
}
