//! Spawner that gives every fired task its own OS thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crate::config::SchedulerConfig;
use crate::core::{Job, SchedulerError, Spawn};

/// Runs each job on a fresh, detached OS thread.
///
/// A panic in a job unwinds that thread only; the dispatcher never joins it.
#[derive(Debug)]
pub struct ThreadSpawner {
    name_prefix: String,
    stack_size: Option<usize>,
    spawned: AtomicU64,
}

impl ThreadSpawner {
    /// Spawner naming its threads `{name_prefix}-{n}`.
    #[must_use]
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: name_prefix.into(),
            stack_size: None,
            spawned: AtomicU64::new(0),
        }
    }

    /// Spawner using the thread name prefix and stack size from `config`.
    #[must_use]
    pub fn from_config(config: &SchedulerConfig) -> Self {
        let mut spawner = Self::new(config.worker_thread_prefix.clone());
        spawner.stack_size = config.thread_stack_size;
        spawner
    }

    /// Set the stack size of spawned threads.
    #[must_use]
    pub const fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Number of threads started so far.
    pub fn spawned(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }
}

impl Default for ThreadSpawner {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

impl Spawn for ThreadSpawner {
    fn spawn(&self, job: Job) -> Result<(), SchedulerError> {
        let n = self.spawned.fetch_add(1, Ordering::Relaxed);
        let mut builder = thread::Builder::new().name(format!("{}-{n}", self.name_prefix));
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }
        builder
            .spawn(job)
            .map(drop)
            .map_err(|e| SchedulerError::Spawn(e.to_string()))
    }
}
