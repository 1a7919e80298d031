//! Scheduling core: task contract, deadline index, dispatcher loop and the
//! ready-made task flavors.

pub mod deadline_index;
pub mod decorators;
pub(crate) mod dispatcher;
pub mod error;
pub mod queue;
pub mod spawn;
pub mod stats;
pub mod submitter;
pub mod task;

pub use deadline_index::DeadlineIndex;
pub use decorators::{ExpBackoffTask, OneShotTask, PeriodicTask, ReschedulableTask};
pub use error::{AppResult, SchedulerError};
pub use queue::{DeadlineQueue, DispatcherHandle};
pub use spawn::{Job, Spawn};
pub use stats::DispatcherStats;
pub use submitter::Submitter;
pub use task::{Runnable, Task, TaskTime, TimeSetter};
