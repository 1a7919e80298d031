//! Tests for the scheduler builder

use std::sync::Arc;

use prometheus_deadline_queue::builders::SchedulerBuilder;
use prometheus_deadline_queue::config::SchedulerConfig;
use prometheus_deadline_queue::core::{Job, SchedulerError, Spawn};
use prometheus_deadline_queue::util::{Clock, ManualClock};

struct InlineSpawner;

impl Spawn for InlineSpawner {
    fn spawn(&self, job: Job) -> Result<(), SchedulerError> {
        job();
        Ok(())
    }
}

#[test]
fn test_builder_defaults() {
    let builder = SchedulerBuilder::new();
    assert_eq!(builder.config(), &SchedulerConfig::default());

    let queue = builder.build().unwrap();
    assert_eq!(queue.config().thread_name, "deadline-dispatcher");
}

#[test]
fn test_builder_configure_and_clock() {
    let clock = Arc::new(ManualClock::new(42));
    let queue = SchedulerBuilder::default()
        .configure(|cfg| cfg.with_thread_name("custom").with_channel_capacity(4))
        .with_clock(clock)
        .build_with_spawner(InlineSpawner)
        .unwrap();

    assert_eq!(queue.config().thread_name, "custom");
    assert_eq!(queue.config().channel_capacity, Some(4));
    assert_eq!(queue.clock().now_nanos(), 42);
}

#[test]
fn test_builder_rejects_invalid_config() {
    let result = SchedulerBuilder::from_config(SchedulerConfig::new().with_worker_thread_prefix(""))
        .build();
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}
