//! Reduction of an enriched user sequence into an [`OverallSummary`].

use crate::error::PipelineError;
use crate::model::{OverallSummary, User};
use futures::{Stream, TryStreamExt};

/// Fold `users` into a summary, starting from zero.
///
/// The fold only counts, so the result does not depend on the order in which
/// users arrive.
pub fn summarize<'a, I>(users: I) -> OverallSummary
where
    I: IntoIterator<Item = &'a User>,
{
    users
        .into_iter()
        .fold(OverallSummary::default(), OverallSummary::accumulate)
}

/// Fold a fallible user stream into a summary.
///
/// # Errors
///
/// Returns the first error yielded by `users`; the fold stops there and the
/// rest of the stream is dropped.
pub async fn try_summarize<S>(users: S) -> Result<OverallSummary, PipelineError>
where
    S: Stream<Item = Result<User, PipelineError>>,
{
    users
        .try_fold(OverallSummary::default(), |summary, user| async move {
            Ok(summary.accumulate(&user))
        })
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Todo;
    use futures::stream;

    fn user_with(id: i64, todo_ids: &[i64]) -> User {
        User::new(id, format!("user {id}")).with_todos(
            todo_ids
                .iter()
                .map(|&t| Todo::new(t, id, "t", false))
                .collect(),
        )
    }

    #[test]
    fn test_empty_input_yields_zero() {
        assert_eq!(summarize(&Vec::<User>::new()), OverallSummary::default());
    }

    #[test]
    fn test_counts_users_and_todos() {
        let users = vec![user_with(1, &[1, 3]), user_with(2, &[2]), user_with(3, &[])];
        assert_eq!(
            summarize(&users),
            OverallSummary {
                user_count: 3,
                todo_count: 3,
            }
        );
    }

    #[test]
    fn test_try_summarize_ok() {
        let users = stream::iter(vec![Ok(user_with(1, &[1, 3])), Ok(user_with(2, &[2]))]);
        let summary = tokio_test::block_on(try_summarize(users)).unwrap();
        assert_eq!(summary.user_count, 2);
        assert_eq!(summary.todo_count, 3);
    }

    #[tokio::test]
    async fn test_try_summarize_stops_at_first_error() {
        let users = stream::iter(vec![
            Ok(user_with(1, &[1])),
            Err(PipelineError::PoolClosed),
            Ok(user_with(2, &[2])),
        ]);
        let err = try_summarize(users).await.unwrap_err();
        assert!(matches!(err, PipelineError::PoolClosed));
    }
}
