//! Dispatcher counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Snapshot of dispatcher activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherStats {
    /// Tasks read from the inbound channel, resubmissions included.
    pub received: u64,
    /// Tasks that were already due on arrival and never touched the index.
    pub dispatched_immediately: u64,
    /// Tasks inserted into the deadline index.
    pub indexed: u64,
    /// Tasks fired after waiting in the index.
    pub dispatched_from_index: u64,
    /// Tasks currently waiting in the index.
    pub pending: u64,
    /// Firings lost because the spawner could not start them.
    pub spawn_failures: u64,
}

impl DispatcherStats {
    /// Total tasks handed to the spawner.
    #[must_use]
    pub const fn dispatched(&self) -> u64 {
        self.dispatched_immediately + self.dispatched_from_index
    }
}

/// Internal counters for dispatcher statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct DispatcherCounters {
    pub received: AtomicU64,
    pub dispatched_immediately: AtomicU64,
    pub indexed: AtomicU64,
    pub dispatched_from_index: AtomicU64,
    pub pending: AtomicU64,
    pub spawn_failures: AtomicU64,
}

impl DispatcherCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> DispatcherStats {
        DispatcherStats {
            received: self.received.load(Ordering::Relaxed),
            dispatched_immediately: self.dispatched_immediately.load(Ordering::Relaxed),
            indexed: self.indexed.load(Ordering::Relaxed),
            dispatched_from_index: self.dispatched_from_index.load(Ordering::Relaxed),
            pending: self.pending.load(Ordering::Relaxed),
            spawn_failures: self.spawn_failures.load(Ordering::Relaxed),
        }
    }
}
