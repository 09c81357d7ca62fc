//! Remote collaborator traits.
//!
//! The pipeline never talks to the network directly. It drives a
//! [`TodoSource`] and a [`UserDirectory`], which the `todo-fanout-client`
//! crate implements over HTTP and the `todo-fanout-testing` crate implements
//! in memory.
//!
//! # Dyn Compatibility
//!
//! Both traits return explicit `Pin<Box<dyn Future>>` values instead of using
//! `async fn`, so they can be held as `Arc<dyn TodoSource>` and moved into
//! spawned enrichment tasks.

use crate::error::SourceError;
use crate::model::{Todo, User, UserId};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by collaborator calls.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Supplies the full, unpaginated todo list.
pub trait TodoSource: Send + Sync {
    /// Retrieve every todo.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the remote cannot be reached or answers
    /// with something other than a todo list. The pipeline treats any error
    /// as fatal.
    fn retrieve_all_todos(&self) -> SourceFuture<'_, Vec<Todo>>;
}

/// Looks up user profiles by id.
pub trait UserDirectory: Send + Sync {
    /// Fetch the profile of `user_id`, with an empty todo list.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] for unknown users and other
    /// [`SourceError`] variants for transport or decoding failures. The
    /// pipeline treats both identically.
    fn find_user(&self, user_id: UserId) -> SourceFuture<'_, User>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct StaticSource(Vec<Todo>);

    impl TodoSource for StaticSource {
        fn retrieve_all_todos(&self) -> SourceFuture<'_, Vec<Todo>> {
            let todos = self.0.clone();
            Box::pin(async move { Ok(todos) })
        }
    }

    struct EmptyDirectory;

    impl UserDirectory for EmptyDirectory {
        fn find_user(&self, user_id: UserId) -> SourceFuture<'_, User> {
            Box::pin(async move { Err(SourceError::NotFound { user_id }) })
        }
    }

    #[tokio::test]
    async fn test_traits_are_usable_as_trait_objects() {
        let source: Arc<dyn TodoSource> = Arc::new(StaticSource(vec![Todo::new(1, 1, "a", false)]));
        let directory: Arc<dyn UserDirectory> = Arc::new(EmptyDirectory);

        assert_eq!(source.retrieve_all_todos().await.unwrap().len(), 1);
        assert_eq!(
            directory.find_user(9).await.unwrap_err(),
            SourceError::NotFound { user_id: 9 }
        );
    }
}
