//! Configuration models for the dispatcher and its threads.

pub mod scheduler;

pub use scheduler::{SchedulerConfig, ENV_PREFIX, MIN_STACK_SIZE};
