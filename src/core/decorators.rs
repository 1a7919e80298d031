//! Ready-made task flavors that wrap a [`Runnable`] callback.
//!
//! They differ only in when the next deadline is computed relative to the
//! callback, and that order is part of their contract:
//!
//! | flavor               | on fire                                                      |
//! |----------------------|--------------------------------------------------------------|
//! | [`OneShotTask`]      | run callback once, never resubmit                            |
//! | [`PeriodicTask`]     | deadline = now + period, run callback, resubmit if period > 0 |
//! | [`ExpBackoffTask`]   | run callback, then deadline = now + backoff, double, resubmit |
//! | [`ReschedulableTask`]| run callback, resubmit only if it called `after*`            |
//!
//! In every flavor, calling [`TimeSetter::stop`] from inside the callback
//! suppresses the resubmission that would otherwise follow it. A stopped task
//! that fires again (because it was already queued, or someone resubmits it
//! by hand) does nothing.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::debug;

use crate::core::{Runnable, Submitter, Task, TaskTime, TimeSetter};
use crate::util::clock::{duration_to_nanos, Clock, Nanos, NANOS_PER_SEC};

/// Callback reference that `stop()` can clear while the callback is running.
struct CallbackSlot(RwLock<Option<Arc<dyn Runnable>>>);

impl CallbackSlot {
    fn new(callback: impl Runnable) -> Self {
        let callback: Arc<dyn Runnable> = Arc::new(callback);
        Self(RwLock::new(Some(callback)))
    }

    /// Clone the callback out so it runs without holding the lock.
    fn get(&self) -> Option<Arc<dyn Runnable>> {
        self.0.read().clone()
    }

    fn take(&self) -> Option<Arc<dyn Runnable>> {
        self.0.write().take()
    }

    fn clear(&self) {
        *self.0.write() = None;
    }

    fn is_empty(&self) -> bool {
        self.0.read().is_none()
    }
}

fn resubmit(task: Arc<dyn Task>, submitter: &Submitter) {
    let deadline = task.deadline();
    if let Err(e) = submitter.submit(task) {
        debug!(deadline, error = %e, "resubmission dropped");
    }
}

/// Fires once at a fixed deadline.
pub struct OneShotTask {
    time: TaskTime,
    callback: CallbackSlot,
}

impl OneShotTask {
    /// Task due immediately; move the deadline with [`TimeSetter::after`]
    /// before submitting.
    pub fn new(clock: Arc<dyn Clock>, callback: impl Runnable) -> Arc<Self> {
        Self::at(clock, 0, callback)
    }

    /// Task due at an absolute time.
    pub fn at(clock: Arc<dyn Clock>, deadline: Nanos, callback: impl Runnable) -> Arc<Self> {
        Arc::new(Self {
            time: TaskTime::at(clock, deadline),
            callback: CallbackSlot::new(callback),
        })
    }

    /// Set an absolute deadline.
    pub fn set_exec_time(&self, nanos: Nanos) {
        self.time.set_exec_time(nanos);
    }

    /// Whether the callback already ran or the task was stopped.
    pub fn is_done(&self) -> bool {
        self.callback.is_empty()
    }
}

impl Task for OneShotTask {
    fn deadline(&self) -> Nanos {
        self.time.exec_time()
    }

    fn execute(self: Arc<Self>, _now: Nanos, _submitter: &Submitter) {
        if let Some(callback) = self.callback.take() {
            callback.run(&*self);
        }
    }
}

impl TimeSetter for OneShotTask {
    fn after(&self, seconds: i64) {
        self.time.after(seconds);
    }

    fn after_nanoseconds(&self, nanoseconds: i64) {
        self.time.after_nanoseconds(nanoseconds);
    }

    fn stop(&self) {
        self.callback.clear();
    }
}

/// Fires every `period` until stopped.
///
/// The next deadline (`now + period`) is recorded *before* the callback runs,
/// so the callback may still override it with `after*` or cancel it with
/// `stop`. A period of zero or less fires once and retires.
pub struct PeriodicTask {
    time: TaskTime,
    period: AtomicI64,
    callback: CallbackSlot,
}

impl PeriodicTask {
    /// Task due immediately that repeats every `period`. Use
    /// [`TimeSetter::after`] to delay the first firing.
    pub fn new(clock: Arc<dyn Clock>, period: Duration, callback: impl Runnable) -> Arc<Self> {
        Arc::new(Self {
            time: TaskTime::new(clock),
            period: AtomicI64::new(duration_to_nanos(period)),
            callback: CallbackSlot::new(callback),
        })
    }

    /// Set the period in seconds.
    pub fn set_period(&self, seconds: i64) {
        self.set_period_nanoseconds(seconds.saturating_mul(NANOS_PER_SEC));
    }

    /// Set the period in nanoseconds. Zero or negative disables repetition.
    pub fn set_period_nanoseconds(&self, nanoseconds: i64) {
        self.period.store(nanoseconds, Ordering::Release);
    }

    /// Current period in nanoseconds.
    pub fn period(&self) -> Nanos {
        self.period.load(Ordering::Acquire)
    }

    /// Set an absolute deadline for the next firing.
    pub fn set_exec_time(&self, nanos: Nanos) {
        self.time.set_exec_time(nanos);
    }

    /// Whether `stop` was called.
    pub fn is_stopped(&self) -> bool {
        self.callback.is_empty()
    }
}

impl Task for PeriodicTask {
    fn deadline(&self) -> Nanos {
        self.time.exec_time()
    }

    fn execute(self: Arc<Self>, now: Nanos, submitter: &Submitter) {
        self.time.set_exec_time(now.saturating_add(self.period()));
        if let Some(callback) = self.callback.get() {
            callback.run(&*self);
        }
        if self.period() <= 0 || self.is_stopped() {
            return;
        }
        resubmit(self, submitter);
    }
}

impl TimeSetter for PeriodicTask {
    fn after(&self, seconds: i64) {
        self.time.after(seconds);
    }

    fn after_nanoseconds(&self, nanoseconds: i64) {
        self.time.after_nanoseconds(nanoseconds);
    }

    fn stop(&self) {
        self.callback.clear();
        self.period.store(0, Ordering::Release);
    }
}

/// Fires with exponentially growing gaps: `B`, `2B`, `4B`, ...
///
/// The callback runs *first*; only afterwards is the next deadline computed
/// as `now + backoff` and the backoff doubled. A backoff of zero or less
/// fires once and retires.
pub struct ExpBackoffTask {
    time: TaskTime,
    backoff: AtomicI64,
    callback: CallbackSlot,
}

impl ExpBackoffTask {
    /// Task due immediately whose first retry comes `initial_backoff` after
    /// its first firing. Use [`TimeSetter::after`] to delay the first firing.
    pub fn new(
        clock: Arc<dyn Clock>,
        initial_backoff: Duration,
        callback: impl Runnable,
    ) -> Arc<Self> {
        Arc::new(Self {
            time: TaskTime::new(clock),
            backoff: AtomicI64::new(duration_to_nanos(initial_backoff)),
            callback: CallbackSlot::new(callback),
        })
    }

    /// Gap that will follow the next firing, in nanoseconds.
    pub fn backoff(&self) -> Nanos {
        self.backoff.load(Ordering::Acquire)
    }

    /// Override the next gap in nanoseconds. Zero or negative disables retries.
    pub fn set_backoff_nanoseconds(&self, nanoseconds: i64) {
        self.backoff.store(nanoseconds, Ordering::Release);
    }

    /// Set an absolute deadline for the next firing.
    pub fn set_exec_time(&self, nanos: Nanos) {
        self.time.set_exec_time(nanos);
    }

    /// Whether `stop` was called.
    pub fn is_stopped(&self) -> bool {
        self.callback.is_empty()
    }
}

impl Task for ExpBackoffTask {
    fn deadline(&self) -> Nanos {
        self.time.exec_time()
    }

    fn execute(self: Arc<Self>, now: Nanos, submitter: &Submitter) {
        if let Some(callback) = self.callback.get() {
            callback.run(&*self);
        }
        if self.is_stopped() {
            return;
        }
        let Ok(backoff) = self
            .backoff
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |b| {
                (b > 0).then(|| b.saturating_mul(2))
            })
        else {
            return;
        };
        self.time.set_exec_time(now.saturating_add(backoff));
        resubmit(self, submitter);
    }
}

impl TimeSetter for ExpBackoffTask {
    fn after(&self, seconds: i64) {
        self.time.after(seconds);
    }

    fn after_nanoseconds(&self, nanoseconds: i64) {
        self.time.after_nanoseconds(nanoseconds);
    }

    fn stop(&self) {
        self.callback.clear();
        self.backoff.store(0, Ordering::Release);
    }
}

/// Fires again only when its callback asks to.
///
/// The callback picks the next deadline with `after` / `after_nanoseconds`
/// on the handle it receives; if it does not, the task retires after this
/// firing. Suited to policies the other flavors do not cover, such as a
/// backoff that gives up after a number of attempts.
pub struct ReschedulableTask {
    time: TaskTime,
    rescheduled: AtomicBool,
    callback: CallbackSlot,
}

impl ReschedulableTask {
    /// Task due immediately. Use [`TimeSetter::after`] to delay the first firing.
    pub fn new(clock: Arc<dyn Clock>, callback: impl Runnable) -> Arc<Self> {
        Arc::new(Self {
            time: TaskTime::new(clock),
            rescheduled: AtomicBool::new(false),
            callback: CallbackSlot::new(callback),
        })
    }

    /// Set an absolute deadline for the next firing.
    pub fn set_exec_time(&self, nanos: Nanos) {
        self.time.set_exec_time(nanos);
    }

    /// Whether `stop` was called.
    pub fn is_stopped(&self) -> bool {
        self.callback.is_empty()
    }
}

impl Task for ReschedulableTask {
    fn deadline(&self) -> Nanos {
        self.time.exec_time()
    }

    fn execute(self: Arc<Self>, _now: Nanos, submitter: &Submitter) {
        self.rescheduled.store(false, Ordering::Release);
        let Some(callback) = self.callback.get() else {
            return;
        };
        callback.run(&*self);
        if self.rescheduled.swap(false, Ordering::AcqRel) && !self.is_stopped() {
            resubmit(self, submitter);
        }
    }
}

impl TimeSetter for ReschedulableTask {
    fn after(&self, seconds: i64) {
        self.time.after(seconds);
        self.rescheduled.store(true, Ordering::Release);
    }

    fn after_nanoseconds(&self, nanoseconds: i64) {
        self.time.after_nanoseconds(nanoseconds);
        self.rescheduled.store(true, Ordering::Release);
    }

    fn stop(&self) {
        self.callback.clear();
        self.rescheduled.store(false, Ordering::Release);
    }
}
