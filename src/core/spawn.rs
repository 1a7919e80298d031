//! Abstraction over where fired tasks run.

use crate::core::SchedulerError;

/// Work handed to a spawner: one task firing.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Abstraction for running a fired task independently of the dispatcher.
///
/// Implementations must return without waiting for `job` to finish; the
/// dispatcher calls this on its own thread and a slow task must not delay
/// the next deadline.
pub trait Spawn: Send + 'static {
    /// Start `job` on its own unit of execution.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Spawn`] if no unit of execution could be created.
    fn spawn(&self, job: Job) -> Result<(), SchedulerError>;
}
