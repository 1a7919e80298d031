//! Tests for the deadline index

use std::sync::Arc;

use prometheus_deadline_queue::core::{DeadlineIndex, Submitter, Task};
use prometheus_deadline_queue::util::Nanos;

struct Fixed(Nanos);

impl Task for Fixed {
    fn deadline(&self) -> Nanos {
        self.0
    }

    fn execute(self: Arc<Self>, _now: Nanos, _submitter: &Submitter) {}
}

#[test]
fn test_index_yields_non_decreasing_deadlines() {
    let mut index = DeadlineIndex::new();
    for d in [90, 10, 50, 10, 70, 30, 50] {
        index.insert(Arc::new(Fixed(d)));
    }
    assert_eq!(index.len(), 7);

    let mut drained = Vec::new();
    while let Some((deadline, task)) = index.delete_min() {
        assert_eq!(deadline, task.deadline());
        drained.push(deadline);
    }
    assert_eq!(drained, vec![10, 10, 30, 50, 50, 70, 90]);
}

#[test]
fn test_pop_due_stops_at_first_future_deadline() {
    let mut index = DeadlineIndex::new();
    for d in [5, 15, 25] {
        index.insert(Arc::new(Fixed(d)));
    }

    let mut fired = Vec::new();
    while let Some((deadline, _)) = index.pop_due(20) {
        fired.push(deadline);
    }
    assert_eq!(fired, vec![5, 15]);
    assert_eq!(index.next_deadline(), Some(25));
    assert_eq!(index.clear(), 1);
    assert!(index.is_empty());
}
