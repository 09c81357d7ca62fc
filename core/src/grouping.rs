//! Group key strategies and the single-pass partitioner.
//!
//! A [`GroupKeyStrategy`] maps every todo to a key. [`partition`] consumes a
//! todo list once and returns one `(key, todos)` bucket per distinct key, in
//! the order keys were first encountered. Callers that need key order sort
//! the buckets afterwards; the key types are totally ordered for that reason.

use crate::model::{Todo, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Maps a todo to the key of the group it belongs to.
///
/// Implementations are total and side-effect free.
pub trait GroupKeyStrategy {
    /// Key type. `Ord` gives a deterministic group sequence.
    type Key: Copy + Ord + Hash + fmt::Debug + fmt::Display;

    /// Key of the group `todo` belongs to.
    fn key_of(&self, todo: &Todo) -> Self::Key;
}

/// Groups todos by their owning user.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByUserId;

impl GroupKeyStrategy for ByUserId {
    type Key = UserId;

    fn key_of(&self, todo: &Todo) -> UserId {
        todo.user_id
    }
}

/// Parity bucket of a user id.
///
/// `Even` sorts before `Odd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Parity {
    /// User id divisible by two
    Even,
    /// Everything else
    Odd,
}

impl Parity {
    /// Parity of a user id. Negative ids use the euclidean remainder.
    #[must_use]
    pub const fn of(user_id: UserId) -> Self {
        if user_id.rem_euclid(2) == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Even => f.write_str("EVEN"),
            Self::Odd => f.write_str("ODD"),
        }
    }
}

/// Groups todos into two buckets by the parity of the owning user id.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByParity;

impl GroupKeyStrategy for ByParity {
    type Key = Parity;

    fn key_of(&self, todo: &Todo) -> Parity {
        Parity::of(todo.user_id)
    }
}

/// Partition `todos` by `strategy` in a single pass.
///
/// Every todo lands in exactly one bucket. Buckets appear in first-encounter
/// order of their key and each bucket keeps its todos in input order.
pub fn partition<S, I>(todos: I, strategy: &S) -> Vec<(S::Key, Vec<Todo>)>
where
    S: GroupKeyStrategy + ?Sized,
    I: IntoIterator<Item = Todo>,
{
    let mut index: HashMap<S::Key, usize> = HashMap::new();
    let mut groups: Vec<(S::Key, Vec<Todo>)> = Vec::new();

    for todo in todos {
        let key = strategy.key_of(&todo);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(todo);
    }

    groups
}
