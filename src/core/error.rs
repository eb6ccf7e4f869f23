//! Error types for work queue construction.

use thiserror::Error;

/// Errors produced when building a work queue.
///
/// Failures of submitted work are never surfaced through this type; the
/// scheduler logs and discards them.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Invalid queue configuration (for example a zero concurrency limit).
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// No tokio runtime was available to host the scheduler.
    #[error("no tokio runtime available to run the work queue")]
    NoRuntime,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
