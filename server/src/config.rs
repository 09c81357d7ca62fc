//! Configuration management for the server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Unparseable values fall back to the default.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use todo_fanout_client::{RemoteConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use todo_fanout_runtime::pool::{PoolConfig, DEFAULT_POOL_PREFIX, DEFAULT_POOL_SIZE};

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "todo_fanout=info,tower_http=debug";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Worker pool configuration
    pub pool: PoolConfig,
    /// Remote API configuration
    pub remote: RemoteConfig,
    /// Serve Prometheus metrics at `/metrics`
    pub metrics_enabled: bool,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Tracing filter directives
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    /// Socket address string to bind.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Time in-flight requests get to finish after a shutdown signal.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = Parsed(&lookup);

        Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed.get("PORT").unwrap_or(8080),
                log_level: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
                shutdown_timeout: parsed.get("SHUTDOWN_TIMEOUT").unwrap_or(30),
            },
            pool: PoolConfig {
                size: parsed
                    .get("TODO_POOL_SIZE")
                    .map_or(DEFAULT_POOL_SIZE, |size: usize| size.max(1)),
                prefix: lookup("TODO_POOL_PREFIX")
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| DEFAULT_POOL_PREFIX.to_string()),
            },
            remote: RemoteConfig {
                base_url: lookup("REMOTE_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout_secs: parsed.get("REMOTE_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            metrics_enabled: parsed.get("METRICS_ENABLED").unwrap_or(true),
        }
    }
}

/// Typed view over a variable lookup.
struct Parsed<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Parsed<'_, F> {
    fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        (self.0)(key).and_then(|s| s.trim().parse().ok())
    }
}
