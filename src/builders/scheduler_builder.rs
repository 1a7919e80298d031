//! Builder assembling a [`DeadlineQueue`] from configuration.

use std::sync::Arc;

use anyhow::Context;

use crate::config::SchedulerConfig;
use crate::core::{AppResult, DeadlineQueue, SchedulerError, Spawn};
use crate::runtime::ThreadSpawner;
use crate::util::clock::{system_clock, Clock};

/// Collects configuration and a clock, then builds a queue.
///
/// Defaults: [`SchedulerConfig::default`], the system clock, and one OS
/// thread per fired task.
#[derive(Clone)]
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    clock: Arc<dyn Clock>,
}

impl SchedulerBuilder {
    /// Builder with default configuration and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(SchedulerConfig::default())
    }

    /// Builder starting from an explicit configuration.
    #[must_use]
    pub fn from_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            clock: system_clock(),
        }
    }

    /// Builder configured from `DEADLINE_QUEUE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Fails if a variable cannot be parsed or the result is invalid.
    pub fn from_env() -> AppResult<Self> {
        let config = SchedulerConfig::from_env()
            .map_err(anyhow::Error::msg)
            .context("loading deadline queue configuration from environment")?;
        Ok(Self::from_config(config))
    }

    /// Replace the clock (e.g. a manual clock in tests).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Adjust the configuration in place.
    #[must_use]
    pub fn configure(mut self, f: impl FnOnce(SchedulerConfig) -> SchedulerConfig) -> Self {
        self.config = f(self.config);
        self
    }

    /// Configuration collected so far.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Build a queue that runs every fired task on its own OS thread.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if the configuration is invalid.
    pub fn build(self) -> Result<DeadlineQueue<ThreadSpawner>, SchedulerError> {
        let spawner = ThreadSpawner::from_config(&self.config);
        self.build_with_spawner(spawner)
    }

    /// Build a queue with a custom spawner.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if the configuration is invalid.
    pub fn build_with_spawner<S: Spawn>(self, spawner: S) -> Result<DeadlineQueue<S>, SchedulerError> {
        DeadlineQueue::new(self.config, self.clock, spawner)
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchedulerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
