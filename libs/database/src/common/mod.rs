//! Connector-independent helpers.

pub mod retry;

pub use retry::{RetryConfig, retry_when, retry_with_backoff};
