//! Deadline queue: owns the inbound channel and runs the dispatcher loop.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use prometheus_deadline_queue::builders::SchedulerBuilder;
//! use prometheus_deadline_queue::core::{PeriodicTask, TimeSetter};
//!
//! let queue = SchedulerBuilder::new().build()?;
//! let clock = queue.clock();
//! let handle = queue.start()?;
//!
//! let heartbeat = PeriodicTask::new(clock, Duration::from_secs(1), |_t: &dyn TimeSetter| {
//!     println!("tick");
//! });
//! heartbeat.after(2);
//! handle.submitter().submit(heartbeat)?;
//!
//! // ...
//! handle.shutdown()?;
//! handle.join()?;
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::debug;

use super::dispatcher::{run_loop, Dispatcher};
use super::stats::DispatcherCounters;
use super::submitter::Message;
use crate::config::SchedulerConfig;
use crate::core::{DispatcherStats, SchedulerError, Spawn, Submitter};
use crate::util::clock::Clock;

/// A dispatcher that has not started yet.
///
/// Tasks may be submitted before [`start`](Self::start) or [`run`](Self::run);
/// they wait in the channel until the loop begins.
pub struct DeadlineQueue<S> {
    config: SchedulerConfig,
    clock: Arc<dyn Clock>,
    spawner: S,
    submitter: Submitter,
    rx: Receiver<Message>,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
    counters: Arc<DispatcherCounters>,
}

impl<S: Spawn> DeadlineQueue<S> {
    /// Create a queue from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if `config` fails validation.
    pub fn new(
        config: SchedulerConfig,
        clock: Arc<dyn Clock>,
        spawner: S,
    ) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        let (submitter, rx) = Submitter::channel(config.channel_capacity);
        let (stop_tx, stop_rx) = bounded(1);
        Ok(Self {
            config,
            clock,
            spawner,
            submitter,
            rx,
            stop_tx,
            stop_rx,
            counters: Arc::new(DispatcherCounters::default()),
        })
    }

    /// Handle for submitting tasks.
    #[must_use]
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Clock the dispatcher compares deadlines against. Tasks should compute
    /// their deadlines from the same clock.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run the dispatcher loop on the current thread until shutdown.
    ///
    /// Returns the final statistics.
    pub fn run(self) -> DispatcherStats {
        let Self {
            clock,
            spawner,
            submitter,
            rx,
            stop_tx,
            stop_rx,
            counters,
            ..
        } = self;
        let stats = drive(spawner, submitter, &rx, &stop_rx, clock.as_ref(), &counters);
        drop(stop_tx);
        stats
    }

    /// Run the dispatcher loop on a dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Spawn`] if the thread cannot be created.
    pub fn start(self) -> Result<DispatcherHandle, SchedulerError> {
        let Self {
            config,
            clock,
            spawner,
            submitter,
            rx,
            stop_tx,
            stop_rx,
            counters,
        } = self;
        let handle_submitter = submitter.clone();
        let handle_counters = Arc::clone(&counters);

        let mut builder = thread::Builder::new().name(config.thread_name.clone());
        if let Some(size) = config.thread_stack_size {
            builder = builder.stack_size(size);
        }
        let thread = builder
            .spawn(move || {
                drive(spawner, submitter, &rx, &stop_rx, clock.as_ref(), &counters);
            })
            .map_err(|e| SchedulerError::Spawn(e.to_string()))?;

        debug!(thread = %config.thread_name, "dispatcher thread spawned");
        Ok(DispatcherHandle {
            submitter: handle_submitter,
            stop: stop_tx,
            counters: handle_counters,
            thread: Some(thread),
        })
    }
}

fn drive<S: Spawn>(
    spawner: S,
    submitter: Submitter,
    rx: &Receiver<Message>,
    stop: &Receiver<()>,
    clock: &dyn Clock,
    counters: &Arc<DispatcherCounters>,
) -> DispatcherStats {
    let dispatcher = Dispatcher::new(spawner, submitter, Arc::clone(counters));
    run_loop(dispatcher, rx, stop, clock);
    counters.snapshot()
}

/// Handle to a dispatcher running on its own thread.
///
/// Dropping the handle stops the dispatcher without waiting for it, even
/// when the inbound channel is full; call [`shutdown`](Self::shutdown) and
/// [`join`](Self::join) for an orderly stop.
#[must_use = "dropping the handle stops the dispatcher"]
pub struct DispatcherHandle {
    submitter: Submitter,
    stop: Sender<()>,
    counters: Arc<DispatcherCounters>,
    thread: Option<JoinHandle<()>>,
}

impl DispatcherHandle {
    /// Handle for submitting tasks.
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Current dispatcher statistics.
    pub fn stats(&self) -> DispatcherStats {
        self.counters.snapshot()
    }

    /// Ask the dispatcher to stop once it has read everything submitted
    /// before this call. Pending tasks are discarded. Blocks while a bounded
    /// channel is full.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Shutdown`] if it already stopped.
    pub fn shutdown(&self) -> Result<(), SchedulerError> {
        self.submitter.shutdown()
    }

    /// Wait for the dispatcher thread to exit.
    ///
    /// Does not request shutdown by itself.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Backend`] if the dispatcher thread panicked.
    pub fn join(mut self) -> Result<DispatcherStats, SchedulerError> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| SchedulerError::Backend("dispatcher thread panicked".into()))?;
        }
        Ok(self.counters.snapshot())
    }

    /// Whether the dispatcher thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for DispatcherHandle {
    fn drop(&mut self) {
        // Full means a stop is already queued. Dropping `stop` afterwards
        // disconnects the channel, which the loop treats the same way.
        let _ = self.stop.try_send(());
    }
}

impl std::fmt::Debug for DispatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherHandle")
            .field("stats", &self.counters.snapshot())
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Job, OneShotTask, TimeSetter};
    use crate::util::clock::{ManualClock, SystemClock};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct InlineSpawner;

    impl Spawn for InlineSpawner {
        fn spawn(&self, job: Job) -> Result<(), SchedulerError> {
            job();
            Ok(())
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = SchedulerConfig::new().with_thread_name("  ");
        let result = DeadlineQueue::new(cfg, Arc::new(SystemClock), InlineSpawner);
        assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
    }

    #[test]
    fn test_run_on_current_thread() {
        let clock = Arc::new(ManualClock::new(1_000));
        let queue =
            DeadlineQueue::new(SchedulerConfig::default(), clock.clone(), InlineSpawner).unwrap();
        let submitter = queue.submitter();
        let hits = Arc::new(AtomicUsize::new(0));

        for deadline in [500, 1_000, 5_000] {
            let hits = Arc::clone(&hits);
            let task = OneShotTask::at(clock.clone(), deadline, move |_t: &dyn TimeSetter| {
                hits.fetch_add(1, Ordering::Relaxed);
            });
            submitter.submit(task).unwrap();
        }
        submitter.shutdown().unwrap();

        let stats = queue.run();
        assert_eq!(hits.load(Ordering::Relaxed), 2);
        assert_eq!(stats.received, 3);
        assert_eq!(stats.dispatched_immediately, 2);
        assert_eq!(stats.indexed, 1);
        assert_eq!(stats.pending, 0);
    }

    /// Poll with far-future tasks until the dispatcher's receiver is gone.
    fn assert_stops(submitter: &Submitter) {
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        loop {
            let far = OneShotTask::at(Arc::clone(&clock), i64::MAX, |_t: &dyn TimeSetter| {});
            if submitter.submit(far).is_err() {
                return;
            }
            assert!(std::time::Instant::now() < deadline, "dispatcher did not stop");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_drop_handle_stops_thread() {
        let queue =
            DeadlineQueue::new(SchedulerConfig::default(), Arc::new(SystemClock), InlineSpawner)
                .unwrap();
        let submitter = queue.submitter();
        let handle = queue.start().unwrap();
        drop(handle);
        assert_stops(&submitter);
    }

    #[test]
    fn test_drop_handle_stops_thread_on_rendezvous_channel() {
        for _ in 0..20 {
            let cfg = SchedulerConfig::default().with_channel_capacity(0);
            let queue = DeadlineQueue::new(cfg, Arc::new(SystemClock), InlineSpawner).unwrap();
            let submitter = queue.submitter();
            drop(queue.start().unwrap());
            assert_stops(&submitter);
        }
    }

    #[test]
    fn test_drop_handle_releases_pending_tasks() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cfg = SchedulerConfig::default().with_channel_capacity(1);
        let queue = DeadlineQueue::new(cfg, Arc::clone(&clock), InlineSpawner).unwrap();
        let handle = queue.start().unwrap();

        let task = OneShotTask::at(Arc::clone(&clock), i64::MAX, |_t: &dyn TimeSetter| {});
        handle.submitter().submit(task.clone()).unwrap();
        let indexed_by = std::time::Instant::now() + Duration::from_secs(5);
        while handle.stats().pending == 0 {
            assert!(std::time::Instant::now() < indexed_by, "task never indexed");
            thread::sleep(Duration::from_millis(5));
        }
        let submitter = handle.submitter();
        drop(handle);
        assert_stops(&submitter);

        assert_eq!(Arc::strong_count(&task), 1);
        assert!(!task.is_done());
    }
}
