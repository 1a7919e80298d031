//! Inbound channel shared by every producer of tasks.

use std::sync::Arc;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::trace;

use crate::core::{SchedulerError, Task};

/// Message carried by the inbound channel.
pub(crate) enum Message {
    /// A new or resubmitted task.
    Task(Arc<dyn Task>),
    /// Stop the dispatcher loop. Pending tasks are discarded.
    Shutdown,
}

/// Cloneable handle for pushing tasks to the dispatcher.
///
/// User code and running tasks use the same handle; the dispatcher cannot
/// tell a resubmission from a fresh submission.
#[derive(Clone)]
pub struct Submitter {
    tx: Sender<Message>,
}

impl Submitter {
    /// Create the inbound channel. `None` means unbounded; `Some(0)` is a
    /// rendezvous channel where every submission waits for the dispatcher.
    pub(crate) fn channel(capacity: Option<usize>) -> (Self, Receiver<Message>) {
        let (tx, rx) = match capacity {
            Some(cap) => bounded(cap),
            None => unbounded(),
        };
        (Self { tx }, rx)
    }

    /// Submit a task. Blocks only when a bounded channel is full.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Shutdown`] once the dispatcher has stopped.
    pub fn submit(&self, task: Arc<dyn Task>) -> Result<(), SchedulerError> {
        trace!(deadline = task.deadline(), "submitting task");
        self.tx
            .send(Message::Task(task))
            .map_err(|_| SchedulerError::Shutdown)
    }

    /// Ask the dispatcher to stop. Tasks still waiting for their deadline are
    /// dropped without running.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Shutdown`] if the dispatcher already stopped.
    pub fn shutdown(&self) -> Result<(), SchedulerError> {
        self.tx
            .send(Message::Shutdown)
            .map_err(|_| SchedulerError::Shutdown)
    }

    /// Number of messages waiting to be read by the dispatcher.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.tx.len()
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("backlog", &self.tx.len())
            .finish()
    }
}
