//! Tests for configuration parsing and validation

use prometheus_deadline_queue::config::{SchedulerConfig, MIN_STACK_SIZE};

#[test]
fn test_default_config_is_valid() {
    let cfg = SchedulerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.thread_name, "deadline-dispatcher");
    assert_eq!(cfg.worker_thread_prefix, "deadline-task");
    assert_eq!(cfg.channel_capacity, None);
    assert_eq!(cfg.thread_stack_size, None);
}

#[test]
fn test_builder_style_setters() {
    let cfg = SchedulerConfig::new()
        .with_thread_name("timers")
        .with_worker_thread_prefix("timer-job")
        .with_channel_capacity(0)
        .with_thread_stack_size(MIN_STACK_SIZE);

    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.thread_name, "timers");
    assert_eq!(cfg.worker_thread_prefix, "timer-job");
    assert_eq!(cfg.channel_capacity, Some(0));
    assert_eq!(cfg.thread_stack_size, Some(MIN_STACK_SIZE));
}

#[test]
fn test_validation_failures() {
    let blank_name = SchedulerConfig::new().with_thread_name("");
    assert!(blank_name.validate().unwrap_err().contains("thread_name"));

    let blank_prefix = SchedulerConfig::new().with_worker_thread_prefix(" ");
    assert!(blank_prefix
        .validate()
        .unwrap_err()
        .contains("worker_thread_prefix"));

    let tiny_stack = SchedulerConfig::new().with_thread_stack_size(MIN_STACK_SIZE - 1);
    assert!(tiny_stack.validate().unwrap_err().contains("thread_stack_size"));
}

#[test]
fn test_from_json_str_fills_defaults() {
    let cfg = SchedulerConfig::from_json_str(r#"{ "channel_capacity": 128 }"#).unwrap();
    assert_eq!(cfg.channel_capacity, Some(128));
    assert_eq!(cfg.thread_name, "deadline-dispatcher");
}

#[test]
fn test_from_json_str_errors() {
    let err = SchedulerConfig::from_json_str("{ not json").unwrap_err();
    assert!(err.starts_with("parse error"));

    let err = SchedulerConfig::from_json_str(r#"{ "thread_stack_size": 16 }"#).unwrap_err();
    assert!(err.contains("thread_stack_size"));
}

#[test]
fn test_json_roundtrip() {
    let cfg = SchedulerConfig::new().with_thread_name("roundtrip");
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(SchedulerConfig::from_json_str(&json).unwrap(), cfg);
}
