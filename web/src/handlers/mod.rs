//! HTTP request handlers.

pub mod health;
pub mod metrics;
pub mod todos;

pub use health::health_check;
pub use metrics::render_metrics;
pub use todos::{list_users, summary};
