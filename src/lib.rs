//! # Prometheus Deadline Queue
//!
//! An in-process scheduler that runs each submitted task no earlier than its
//! deadline, as close to it as practical, without polling and without a
//! timer per task.
//!
//! ## How it works
//!
//! A single dispatcher thread owns an ordered index of pending deadlines and
//! blocks on exactly one thing: the inbound channel, with a timeout equal to
//! the time left until the earliest deadline. When something is due it is
//! handed to a spawner and runs on its own thread; the dispatcher never waits
//! for user code.
//!
//! Tasks that want to run again (periodic timers, retries with exponential
//! backoff) push themselves back onto the same channel from inside their own
//! execution. The dispatcher knows nothing about those policies.
//!
//! ## Key Features
//!
//! - **One wait primitive**: any number of deadlines multiplexed on one channel receive
//! - **Never early**: a task fires only once the clock has reached its deadline
//! - **Self-resubmission**: periodic, backoff and callback-driven rescheduling
//! - **Pluggable clock**: deterministic tests with [`util::ManualClock`]
//! - **Pluggable spawner**: OS threads by default, Tokio's blocking pool optionally
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use prometheus_deadline_queue::builders::SchedulerBuilder;
//! use prometheus_deadline_queue::core::{ExpBackoffTask, OneShotTask, TimeSetter};
//!
//! let queue = SchedulerBuilder::from_env()?.build()?;
//! let clock = queue.clock();
//! let handle = queue.start()?;
//! let submitter = handle.submitter();
//!
//! let hello = OneShotTask::new(clock.clone(), |_t: &dyn TimeSetter| println!("hello"));
//! hello.after(1);
//! submitter.submit(hello)?;
//!
//! let retry = ExpBackoffTask::new(clock, Duration::from_secs(2), move |t: &dyn TimeSetter| {
//!     if try_connect().is_ok() {
//!         t.stop();
//!     }
//! });
//! submitter.submit(retry)?;
//! ```
//!
//! Pending tasks live in memory only; shutting the dispatcher down discards
//! them.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Scheduling core: tasks, deadline index, dispatcher loop.
pub mod core;
/// Configuration models for the dispatcher and its threads.
pub mod config;
/// Builders to construct a queue from configuration.
pub mod builders;
/// Spawners running fired tasks (OS threads, Tokio).
pub mod runtime;
/// Shared utilities: clocks and telemetry.
pub mod util;
