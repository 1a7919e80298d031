//! Task contract shared by the dispatcher and every task flavor.
//!
//! A task only has to answer two questions: when it wants to run
//! ([`Task::deadline`]) and what to do when that time comes
//! ([`Task::execute`]). Whether it runs again is entirely its own business:
//! a task that wants another firing pushes itself back through the
//! [`Submitter`] it is handed, exactly like any other producer.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prometheus_deadline_queue::core::{Submitter, Task, TaskTime};
//! use prometheus_deadline_queue::util::{Clock, Nanos};
//!
//! struct Reminder {
//!     time: TaskTime,
//!     text: String,
//! }
//!
//! impl Task for Reminder {
//!     fn deadline(&self) -> Nanos {
//!         self.time.exec_time()
//!     }
//!
//!     fn execute(self: Arc<Self>, now: Nanos, _submitter: &Submitter) {
//!         println!("{now}: {}", self.text);
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::core::Submitter;
use crate::util::clock::{Clock, Nanos, NANOS_PER_SEC};

/// A unit of work with a target execution timestamp.
pub trait Task: Send + Sync + 'static {
    /// Earliest time this task may run, in nanoseconds since the Unix epoch.
    fn deadline(&self) -> Nanos;

    /// Run the task.
    ///
    /// Called on its own thread of execution once `deadline()` has passed.
    /// `now` is the dispatcher's reading of the clock when it fired the task.
    /// The task may resubmit itself through `submitter`.
    fn execute(self: Arc<Self>, now: Nanos, submitter: &Submitter);
}

/// Capability handed to a running callback so it can pick its next deadline
/// or stop itself for good.
pub trait TimeSetter {
    /// Next deadline `seconds` from now, at whole-second resolution.
    fn after(&self, seconds: i64);
    /// Next deadline `nanoseconds` from now.
    fn after_nanoseconds(&self, nanoseconds: i64);
    /// Disable every future effect of this task.
    fn stop(&self);
}

/// User logic wrapped by the task flavors in [`crate::core::decorators`].
pub trait Runnable: Send + Sync + 'static {
    /// Run once. `timer` belongs to the task currently firing.
    fn run(&self, timer: &dyn TimeSetter);
}

impl<F> Runnable for F
where
    F: Fn(&dyn TimeSetter) + Send + Sync + 'static,
{
    fn run(&self, timer: &dyn TimeSetter) {
        self(timer);
    }
}

/// Shared execution-time holder for task implementations.
///
/// Most tasks do not want to compute absolute timestamps themselves; they
/// embed a `TaskTime` and say "run me in three seconds".
pub struct TaskTime {
    exec_time: AtomicI64,
    clock: Arc<dyn Clock>,
}

impl TaskTime {
    /// Holder with an execution time of `0`, which is always due.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::at(clock, 0)
    }

    /// Holder with an absolute execution time.
    #[must_use]
    pub fn at(clock: Arc<dyn Clock>, exec_time: Nanos) -> Self {
        Self {
            exec_time: AtomicI64::new(exec_time),
            clock,
        }
    }

    /// Current execution time.
    pub fn exec_time(&self) -> Nanos {
        self.exec_time.load(Ordering::Acquire)
    }

    /// Set an absolute execution time.
    pub fn set_exec_time(&self, nanos: Nanos) {
        self.exec_time.store(nanos, Ordering::Release);
    }

    /// Execute `seconds` after the current whole second.
    pub fn after(&self, seconds: i64) {
        let at = self
            .clock
            .now_seconds()
            .saturating_add(seconds)
            .saturating_mul(NANOS_PER_SEC);
        self.set_exec_time(at);
    }

    /// Execute `nanoseconds` after now.
    pub fn after_nanoseconds(&self, nanoseconds: i64) {
        self.set_exec_time(self.clock.now_nanos().saturating_add(nanoseconds));
    }

    /// Clock used for relative deadlines.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

impl std::fmt::Debug for TaskTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskTime")
            .field("exec_time", &self.exec_time())
            .finish_non_exhaustive()
    }
}
