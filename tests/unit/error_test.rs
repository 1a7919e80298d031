//! Tests for error types

use prometheus_deadline_queue::core::{AppResult, SchedulerError};

#[test]
fn test_scheduler_error_display() {
    assert_eq!(SchedulerError::Shutdown.to_string(), "scheduler has shut down");
    assert_eq!(
        SchedulerError::InvalidConfig("thread_name must not be empty".into()).to_string(),
        "invalid configuration: thread_name must not be empty"
    );
    assert_eq!(
        SchedulerError::Spawn("out of threads".into()).to_string(),
        "spawn failed: out of threads"
    );
    assert_eq!(
        SchedulerError::Backend("boom".into()).to_string(),
        "backend error: boom"
    );
}

#[test]
fn test_scheduler_error_converts_to_anyhow() {
    fn submit() -> AppResult<()> {
        Err(SchedulerError::Shutdown)?;
        Ok(())
    }

    let err = submit().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchedulerError>(),
        Some(SchedulerError::Shutdown)
    ));
}
