//! # Todo Fanout Testing
//!
//! Testing utilities for the todo fan-out pipeline.
//!
//! This crate provides:
//! - [`InMemoryTodoSource`]: a [`TodoSource`](todo_fanout_core::TodoSource)
//!   over a fixed list, optionally failing
//! - [`InMemoryUserDirectory`]: a
//!   [`UserDirectory`](todo_fanout_core::UserDirectory) with per-user
//!   failures, artificial latency and a lookup log for concurrency assertions
//! - [`fixtures`]: todo builders and proptest strategies
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use todo_fanout_testing::{fixtures, InMemoryTodoSource, InMemoryUserDirectory};
//!
//! let source = Arc::new(InMemoryTodoSource::new(fixtures::scenario_todos()));
//! let directory = Arc::new(InMemoryUserDirectory::permissive());
//! assert_eq!(source.calls(), 0);
//! assert!(directory.lookups().is_empty());
//! ```

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Mutex poisoning only happens after a test already failed

pub mod fixtures;
pub mod mocks;

pub use mocks::{InMemoryTodoSource, InMemoryUserDirectory, LookupEvent};
