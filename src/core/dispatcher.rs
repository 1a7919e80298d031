//! Dispatcher state machine and the loop that drives it.
//!
//! The loop multiplexes every pending deadline onto a single blocking wait:
//! a select over the inbound channel and the stop channel whose timeout is
//! the time left until the earliest indexed deadline (no timeout at all when
//! nothing is pending).
//!
//! - A task that is already due on arrival is fired right away and never
//!   enters the index.
//! - Anything else goes into the [`DeadlineIndex`].
//! - After every wake-up, whatever is due is drained in deadline order.
//! - The timeout is recomputed from the index right before each wait, so a
//!   submission with an earlier deadline shortens the next wait.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{select, Receiver, RecvError};
use tracing::{debug, info, trace, warn};

use super::spawn::{Job, Spawn};
use super::stats::DispatcherCounters;
use super::submitter::Message;
use crate::core::{DeadlineIndex, Submitter, Task};
use crate::util::clock::{nanos_to_duration, Clock, Nanos};

/// What happened to a task read from the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Accepted {
    /// Already due; handed to the spawner.
    Dispatched,
    /// Waiting in the index.
    Pending,
}

/// Scheduling decisions of the dispatcher loop, free of any blocking.
///
/// Owns the deadline index exclusively; only the dispatcher thread touches it.
pub(crate) struct Dispatcher<S> {
    index: DeadlineIndex,
    spawner: S,
    submitter: Submitter,
    counters: Arc<DispatcherCounters>,
}

impl<S: Spawn> Dispatcher<S> {
    /// `submitter` is handed to every fired task so it can resubmit itself.
    pub(crate) fn new(spawner: S, submitter: Submitter, counters: Arc<DispatcherCounters>) -> Self {
        Self {
            index: DeadlineIndex::new(),
            spawner,
            submitter,
            counters,
        }
    }

    /// Handle a task read from the inbound channel.
    pub(crate) fn accept(&mut self, task: Arc<dyn Task>, now: Nanos) -> Accepted {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        let deadline = task.deadline();

        if deadline <= now {
            trace!(deadline, now, "task already due");
            if self.dispatch(task, now) {
                self.counters
                    .dispatched_immediately
                    .fetch_add(1, Ordering::Relaxed);
            }
            return Accepted::Dispatched;
        }

        if self.index.insert_at(deadline, task) {
            self.counters.indexed.fetch_add(1, Ordering::Relaxed);
        }
        self.sync_pending();
        trace!(deadline, pending = self.pending(), "task indexed");
        Accepted::Pending
    }

    /// Fire every indexed task whose deadline is at or before `now`, earliest
    /// first. Returns how many were fired.
    pub(crate) fn drain_due(&mut self, now: Nanos) -> usize {
        let mut fired = 0;
        while let Some((deadline, task)) = self.index.pop_due(now) {
            trace!(deadline, late_ns = now.saturating_sub(deadline), "firing task");
            if self.dispatch(task, now) {
                self.counters
                    .dispatched_from_index
                    .fetch_add(1, Ordering::Relaxed);
            }
            fired += 1;
        }
        if fired > 0 {
            self.sync_pending();
        }
        fired
    }

    /// How long to wait for the next deadline; `None` means wait forever.
    pub(crate) fn next_wait(&self, now: Nanos) -> Option<Duration> {
        self.index
            .next_deadline()
            .map(|deadline| nanos_to_duration(deadline.saturating_sub(now)))
    }

    /// Number of indexed tasks.
    pub(crate) fn pending(&self) -> usize {
        self.index.len()
    }

    /// Drop everything still waiting. Nothing is fired.
    pub(crate) fn discard_pending(&mut self) -> usize {
        let discarded = self.index.clear();
        self.sync_pending();
        discarded
    }

    fn dispatch(&self, task: Arc<dyn Task>, now: Nanos) -> bool {
        let submitter = self.submitter.clone();
        let job: Job = Box::new(move || task.execute(now, &submitter));
        match self.spawner.spawn(job) {
            Ok(()) => true,
            Err(e) => {
                self.counters.spawn_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "failed to start task, dropping this firing");
                false
            }
        }
    }

    fn sync_pending(&self) {
        self.counters
            .pending
            .store(self.pending() as u64, Ordering::Relaxed);
    }
}

/// What woke the dispatcher up.
enum Event {
    Message(Message),
    Timeout,
    Stop(&'static str),
}

/// Block until a message, a stop signal, or `wait` elapses (`None` waits
/// without a deadline). A dropped handle disconnects `stop`.
fn next_event(rx: &Receiver<Message>, stop: &Receiver<()>, wait: Option<Duration>) -> Event {
    let inbound =
        |msg: Result<Message, RecvError>| msg.map_or(Event::Stop("disconnected"), Event::Message);
    let stopped = |sig: Result<(), RecvError>| {
        Event::Stop(if sig.is_ok() { "stop requested" } else { "disconnected" })
    };
    match wait {
        None => select! {
            recv(rx) -> msg => inbound(msg),
            recv(stop) -> sig => stopped(sig),
        },
        Some(wait) => select! {
            recv(rx) -> msg => inbound(msg),
            recv(stop) -> sig => stopped(sig),
            default(wait) => Event::Timeout,
        },
    }
}

/// Run the dispatcher until a shutdown message arrives on `rx` or `stop`
/// fires. `stop` fires on a send or when its last sender is dropped.
pub(crate) fn run_loop<S: Spawn>(
    mut dispatcher: Dispatcher<S>,
    rx: &Receiver<Message>,
    stop: &Receiver<()>,
    clock: &dyn Clock,
) {
    info!("dispatcher loop started");
    loop {
        match next_event(rx, stop, dispatcher.next_wait(clock.now_nanos())) {
            Event::Message(Message::Task(task)) => {
                dispatcher.accept(task, clock.now_nanos());
            }
            Event::Message(Message::Shutdown) => {
                debug!("shutdown requested");
                break;
            }
            Event::Timeout => {}
            Event::Stop(reason) => {
                debug!(reason, "dispatcher stopping");
                break;
            }
        }

        dispatcher.drain_due(clock.now_nanos());
    }

    let discarded = dispatcher.discard_pending();
    info!(discarded, "dispatcher loop stopped");
}
