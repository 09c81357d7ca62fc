//! Todo builders and property-test strategies.

use proptest::prelude::*;
use todo_fanout_core::{Todo, UserId};

/// A todo titled after its id.
#[must_use]
pub fn todo(id: i64, user_id: UserId) -> Todo {
    Todo::new(id, user_id, format!("todo {id}"), id % 3 == 0)
}

/// `[{id:1,userId:1}, {id:2,userId:2}, {id:3,userId:1}]`
#[must_use]
pub fn scenario_todos() -> Vec<Todo> {
    vec![todo(1, 1), todo(2, 2), todo(3, 1)]
}

/// `per_user` todos for each of `users` users (ids `1..=users`), interleaved
/// the way a remote list usually is: user-major blocks.
#[must_use]
pub fn sample_todos(users: i64, per_user: i64) -> Vec<Todo> {
    (1..=users)
        .flat_map(|user_id| {
            (0..per_user).map(move |n| todo((user_id - 1) * per_user + n + 1, user_id))
        })
        .collect()
}

/// Arbitrary todo lists with unique ids and owners drawn from `1..max_user`.
pub fn arb_todos(max_user: UserId, max_len: usize) -> impl Strategy<Value = Vec<Todo>> {
    prop::collection::vec(1..max_user.max(2), 0..max_len).prop_map(|owners| {
        owners
            .into_iter()
            .zip(1i64..)
            .map(|(user_id, id)| todo(id, user_id))
            .collect()
    })
}
