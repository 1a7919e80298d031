//! Tokio runtime spawner implementation.

use tokio::runtime::Handle;

use crate::core::{Job, SchedulerError, Spawn};

/// Runs fired tasks on a Tokio runtime's blocking pool.
///
/// Task callbacks are plain synchronous code, so they go through
/// `spawn_blocking` and never stall the runtime's async workers.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    /// Create a new `TokioSpawner` from a tokio runtime handle.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawner bound to the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Spawn`] when called outside a Tokio runtime.
    pub fn current() -> Result<Self, SchedulerError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| SchedulerError::Spawn(e.to_string()))
    }
}

impl Spawn for TokioSpawner {
    fn spawn(&self, job: Job) -> Result<(), SchedulerError> {
        drop(self.handle.spawn_blocking(job));
        Ok(())
    }
}
