//! Tokio runtime spawner implementation.

use std::future::Future;

use crate::core::{QueueError, Spawn};

/// Tokio-based spawner that runs the scheduler and its jobs on a runtime.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    /// Create a spawner from an explicit tokio runtime handle.
    #[must_use]
    pub const fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Create a spawner bound to the runtime of the calling context.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NoRuntime`] when called outside a tokio runtime.
    pub fn current() -> Result<Self, QueueError> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|_| QueueError::NoRuntime)
    }

    /// The underlying runtime handle.
    #[must_use]
    pub const fn handle(&self) -> &tokio::runtime::Handle {
        &self.handle
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut);
    }
}
