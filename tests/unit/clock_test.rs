//! Tests for clocks and time conversion helpers

use std::time::Duration;

use prometheus_deadline_queue::util::{
    duration_to_nanos, nanos_to_duration, now_nanos, system_clock, Clock, ManualClock,
    NANOS_PER_SEC,
};

#[test]
fn test_manual_clock_moves_only_when_told() {
    let clock = ManualClock::new(5 * NANOS_PER_SEC + 1);
    assert_eq!(clock.now_nanos(), 5 * NANOS_PER_SEC + 1);
    assert_eq!(clock.now_seconds(), 5);

    clock.advance(Duration::from_millis(1_500));
    assert_eq!(clock.now_nanos(), 6 * NANOS_PER_SEC + 500_000_001);

    clock.set(0);
    assert_eq!(clock.now_nanos(), 0);
}

#[test]
fn test_now_seconds_floors_before_epoch() {
    let clock = ManualClock::new(-1);
    assert_eq!(clock.now_seconds(), -1);
}

#[test]
fn test_system_clock_is_monotonic_enough() {
    let clock = system_clock();
    let a = clock.now_nanos();
    let b = now_nanos();
    assert!(a > 0);
    assert!(b >= a);
}

#[test]
fn test_duration_conversions() {
    assert_eq!(duration_to_nanos(Duration::from_secs(2)), 2 * NANOS_PER_SEC);
    assert_eq!(duration_to_nanos(Duration::MAX), i64::MAX);
    assert_eq!(nanos_to_duration(1_500), Duration::from_nanos(1_500));
    assert_eq!(nanos_to_duration(-20), Duration::ZERO);
}
