//! Per-user enrichment unit.

use crate::metrics::EnrichmentMetrics;
use std::sync::Arc;
use std::time::Instant;
use todo_fanout_core::{PipelineError, Result, SourceError, Todo, User, UserDirectory, UserId};

/// Builds a [`User`] from a profile lookup and an already-grouped todo list.
///
/// Cloning is cheap; every spawned unit owns its own clone.
#[derive(Clone)]
pub struct UserEnricher {
    directory: Arc<dyn UserDirectory>,
}

impl UserEnricher {
    /// Create an enricher backed by `directory`.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Fetch the profile of `user_id` and attach `todos`.
    ///
    /// The todos are moved in as-is; no additional fetch is made for them.
    /// `group` names the top-level group for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Enrichment`] when the profile lookup fails or
    /// the directory answers with a profile for a different user.
    pub async fn enrich(&self, group: &str, user_id: UserId, todos: Vec<Todo>) -> Result<User> {
        tracing::debug!(user_id, group, todos = todos.len(), "Getting user with todos");
        let start = Instant::now();

        let profile = self
            .directory
            .find_user(user_id)
            .await
            .and_then(|profile| {
                if profile.id == user_id {
                    Ok(profile)
                } else {
                    Err(SourceError::Decode(format!(
                        "requested user {user_id}, received profile for user {}",
                        profile.id
                    )))
                }
            });

        match profile {
            Ok(profile) => {
                EnrichmentMetrics::record_success(start.elapsed());
                Ok(profile.with_todos(todos))
            }
            Err(source) => {
                EnrichmentMetrics::record_failure();
                tracing::warn!(user_id, group, error = %source, "User lookup failed");
                Err(PipelineError::Enrichment {
                    group: group.to_string(),
                    user_id,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use todo_fanout_core::SourceFuture;

    struct Directory;

    impl UserDirectory for Directory {
        fn find_user(&self, user_id: UserId) -> SourceFuture<'_, User> {
            Box::pin(async move {
                match user_id {
                    1 => Ok(User::new(1, "Leanne Graham")),
                    2 => Ok(User::new(99, "Impostor")),
                    _ => Err(SourceError::NotFound { user_id }),
                }
            })
        }
    }

    fn enricher() -> UserEnricher {
        UserEnricher::new(Arc::new(Directory))
    }

    #[tokio::test]
    async fn test_enrich_attaches_todos_in_order() {
        let todos = vec![Todo::new(3, 1, "c", false), Todo::new(1, 1, "a", true)];
        let user = enricher().enrich("ODD", 1, todos.clone()).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.name, "Leanne Graham");
        assert_eq!(user.todos, todos);
    }

    #[tokio::test]
    async fn test_enrich_propagates_not_found() {
        let err = enricher().enrich("ODD", 7, Vec::new()).await.unwrap_err();
        match err {
            PipelineError::Enrichment { group, user_id, source } => {
                assert_eq!(group, "ODD");
                assert_eq!(user_id, 7);
                assert_eq!(source, SourceError::NotFound { user_id: 7 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_enrich_rejects_mismatched_profile() {
        let err = enricher().enrich("EVEN", 2, Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Enrichment {
                source: SourceError::Decode(_),
                ..
            }
        ));
    }
}
