//! Records flowing through the pipeline.
//!
//! All records serialize with the camelCase field names used on the wire
//! (`userId`, `userCount`, `todoCount`).

use serde::{Deserialize, Serialize};

/// Identifier of a user, as carried by [`Todo::user_id`] and [`User::id`].
pub type UserId = i64;

/// A single todo record, immutable once received from the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Todo identifier
    pub id: i64,
    /// Owning user
    pub user_id: UserId,
    /// Free-form title
    #[serde(default)]
    pub title: String,
    /// Completion flag
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// Create a todo record.
    #[must_use]
    pub fn new(id: i64, user_id: UserId, title: impl Into<String>, completed: bool) -> Self {
        Self {
            id,
            user_id,
            title: title.into(),
            completed,
        }
    }
}

/// A user profile, optionally enriched with the user's todos.
///
/// Profiles returned by a [`UserDirectory`](crate::UserDirectory) carry an
/// empty `todos` list. The enricher attaches the grouped todos with
/// [`User::with_todos`]; after that the value is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Login handle
    #[serde(default)]
    pub username: String,
    /// Contact email
    #[serde(default)]
    pub email: String,
    /// Contact phone
    #[serde(default)]
    pub phone: String,
    /// Personal website
    #[serde(default)]
    pub website: String,
    /// Todos owned by this user, in encounter order
    #[serde(default)]
    pub todos: Vec<Todo>,
}

impl User {
    /// Create a bare profile with only an id and a name.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            username: String::new(),
            email: String::new(),
            phone: String::new(),
            website: String::new(),
            todos: Vec::new(),
        }
    }

    /// Return this profile with `todos` attached, replacing any previous list.
    #[must_use]
    pub fn with_todos(self, todos: Vec<Todo>) -> Self {
        Self { todos, ..self }
    }

    /// Number of todos attached to this user.
    #[must_use]
    pub fn todo_count(&self) -> usize {
        self.todos.len()
    }
}

/// Aggregate counts over an enriched user sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    /// Number of users observed
    pub user_count: u64,
    /// Total number of todos across those users
    pub todo_count: u64,
}

impl OverallSummary {
    /// Fold one user into the running summary.
    #[must_use]
    pub fn accumulate(self, user: &User) -> Self {
        Self {
            user_count: self.user_count + 1,
            todo_count: self.todo_count + user.todos.len() as u64,
        }
    }
}
