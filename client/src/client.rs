//! reqwest implementation of the todo source and user directory.

use crate::error::ClientError;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use todo_fanout_core::{SourceError, SourceFuture, Todo, TodoSource, User, UserDirectory, UserId};

/// Default remote API root.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Remote API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// API root, without a trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RemoteConfig {
    /// Config pointing at `base_url` with the default timeout.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// JSON client for a JSONPlaceholder-style API.
///
/// Serves `GET {base}/todos` as the [`TodoSource`] and `GET {base}/users/{id}`
/// as the [`UserDirectory`]. Cloning is cheap; clones share the connection
/// pool.
#[derive(Clone, Debug)]
pub struct HttpTodoClient {
    client: Client,
    base_url: String,
}

impl HttpTodoClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Build` if the underlying HTTP client cannot be
    /// constructed (for example when the TLS backend fails to initialise).
    pub fn new(config: &RemoteConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// API root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<Response, SourceError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(url = %url, "GET");

        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))
    }

    async fn fetch_todos(&self) -> Result<Vec<Todo>, SourceError> {
        let response = self.get("/todos").await?;
        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        decode(response).await
    }

    async fn fetch_user(&self, user_id: UserId) -> Result<User, SourceError> {
        let response = self.get(&format!("/users/{user_id}")).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(SourceError::NotFound { user_id }),
            status if status.is_success() => decode(response).await,
            _ => Err(unexpected_status(response).await),
        }
    }
}

impl TodoSource for HttpTodoClient {
    fn retrieve_all_todos(&self) -> SourceFuture<'_, Vec<Todo>> {
        Box::pin(self.fetch_todos())
    }
}

impl UserDirectory for HttpTodoClient {
    fn find_user(&self, user_id: UserId) -> SourceFuture<'_, User> {
        Box::pin(self.fetch_user(user_id))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SourceError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| SourceError::Transport(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| SourceError::Decode(e.to_string()))
}

async fn unexpected_status(response: Response) -> SourceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        body
    };
    SourceError::Status {
        status: status.as_u16(),
        message,
    }
}
