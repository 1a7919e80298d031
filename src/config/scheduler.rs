//! Dispatcher configuration.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Smallest stack size accepted for dispatcher and task threads.
pub const MIN_STACK_SIZE: usize = 64 * 1024;

/// Prefix of the environment variables read by [`SchedulerConfig::from_env`].
pub const ENV_PREFIX: &str = "DEADLINE_QUEUE_";

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Name of the dispatcher thread.
    pub thread_name: String,
    /// Name prefix for threads started to run fired tasks.
    pub worker_thread_prefix: String,
    /// Inbound channel capacity. `None` is unbounded; `Some(0)` makes every
    /// submission wait for the dispatcher to pick it up.
    pub channel_capacity: Option<usize>,
    /// Stack size for the dispatcher and task threads; platform default if unset.
    pub thread_stack_size: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            thread_name: "deadline-dispatcher".into(),
            worker_thread_prefix: "deadline-task".into(),
            channel_capacity: None,
            thread_stack_size: None,
        }
    }
}

impl SchedulerConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dispatcher thread name.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Set the task thread name prefix.
    #[must_use]
    pub fn with_worker_thread_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.worker_thread_prefix = prefix.into();
        self
    }

    /// Bound the inbound channel.
    #[must_use]
    pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    /// Set the thread stack size in bytes.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = Some(bytes);
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.thread_name.trim().is_empty() {
            return Err("thread_name must not be empty".into());
        }
        if self.worker_thread_prefix.trim().is_empty() {
            return Err("worker_thread_prefix must not be empty".into());
        }
        if let Some(size) = self.thread_stack_size {
            if size < MIN_STACK_SIZE {
                return Err(format!(
                    "thread_stack_size must be at least {MIN_STACK_SIZE} bytes, got {size}"
                ));
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate. Missing fields
    /// take their default values.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `DEADLINE_QUEUE_*` environment variables,
    /// loading a `.env` file first if one exists.
    ///
    /// | variable                            | field                  |
    /// |-------------------------------------|------------------------|
    /// | `DEADLINE_QUEUE_THREAD_NAME`        | `thread_name`          |
    /// | `DEADLINE_QUEUE_WORKER_PREFIX`      | `worker_thread_prefix` |
    /// | `DEADLINE_QUEUE_CHANNEL_CAPACITY`   | `channel_capacity`     |
    /// | `DEADLINE_QUEUE_STACK_SIZE`         | `thread_stack_size`    |
    ///
    /// # Errors
    ///
    /// Returns a description of an unparsable variable or a validation failure.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns a description of an unparsable variable or a validation failure.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut cfg = Self::default();

        if let Some(name) = var("THREAD_NAME") {
            cfg.thread_name = name;
        }
        if let Some(prefix) = var("WORKER_PREFIX") {
            cfg.worker_thread_prefix = prefix;
        }
        if let Some(raw) = var("CHANNEL_CAPACITY") {
            cfg.channel_capacity = Some(parse_var("CHANNEL_CAPACITY", &raw)?);
        }
        if let Some(raw) = var("STACK_SIZE") {
            cfg.thread_stack_size = Some(parse_var("STACK_SIZE", &raw)?);
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| format!("{ENV_PREFIX}{name}={raw:?}: {e}"))
}
