//! Time sources used by the dispatcher and by task deadline computation.
//!
//! All timestamps are signed nanoseconds since the Unix epoch. The dispatcher
//! never reads the system clock directly; it goes through a [`Clock`] so that
//! tests can drive time by hand with [`ManualClock`].

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch.
pub type Nanos = i64;

/// Nanoseconds in one second.
pub const NANOS_PER_SEC: Nanos = 1_000_000_000;

/// Source of the current time.
pub trait Clock: Send + Sync + 'static {
    /// Current time in nanoseconds since the Unix epoch.
    fn now_nanos(&self) -> Nanos;

    /// Current time in whole seconds since the Unix epoch.
    fn now_seconds(&self) -> i64 {
        self.now_nanos().div_euclid(NANOS_PER_SEC)
    }
}

/// Wall clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> Nanos {
        now_nanos()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    #[must_use]
    pub const fn new(start: Nanos) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Jump to an absolute time. Moving backwards is allowed.
    pub fn set(&self, now: Nanos) {
        self.now.store(now, Ordering::Release);
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(duration_to_nanos(by), Ordering::AcqRel);
    }

    /// Move forward by a raw nanosecond count.
    pub fn advance_nanos(&self, by: Nanos) {
        self.now.fetch_add(by, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> Nanos {
        self.now.load(Ordering::Acquire)
    }
}

/// Shared handle to the system clock.
#[must_use]
pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// Current wall-clock time in nanoseconds since the Unix epoch.
///
/// Saturates at `i64::MAX`; a clock set before the epoch reads as `0`.
#[must_use]
pub fn now_nanos() -> Nanos {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, duration_to_nanos)
}

/// Convert a [`Duration`] to nanoseconds, saturating at `i64::MAX`.
#[must_use]
pub fn duration_to_nanos(d: Duration) -> Nanos {
    Nanos::try_from(d.as_nanos()).unwrap_or(Nanos::MAX)
}

/// Convert nanoseconds to a [`Duration`]; negative values become zero.
#[must_use]
pub fn nanos_to_duration(nanos: Nanos) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(0))
}
