//! Builders to construct a deadline queue from configuration.

pub mod scheduler_builder;

pub use scheduler_builder::SchedulerBuilder;
