//! Ordered index of tasks that are known but not yet due.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::Task;
use crate::util::clock::Nanos;

/// Ordering key: earliest deadline first, ties broken by task identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct IndexKey {
    deadline: Nanos,
    identity: usize,
}

/// Address of the task allocation. Stable while the index holds the `Arc`.
fn identity(task: &Arc<dyn Task>) -> usize {
    Arc::as_ptr(task).cast::<()>() as usize
}

/// Tasks ordered by deadline, with O(log n) insert and delete-min.
///
/// The deadline is read once, on insert. A task that changes its own deadline
/// while indexed keeps its old position; it is expected to resubmit instead.
/// The index is owned by the dispatcher thread and is never shared.
#[derive(Default)]
pub struct DeadlineIndex {
    entries: BTreeMap<IndexKey, Arc<dyn Task>>,
}

impl DeadlineIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task under its current deadline.
    ///
    /// Inserting the same task instance again with the same deadline replaces
    /// the existing entry and returns `false`.
    pub fn insert(&mut self, task: Arc<dyn Task>) -> bool {
        self.insert_at(task.deadline(), task)
    }

    /// Insert under a deadline the caller already read from the task.
    pub fn insert_at(&mut self, deadline: Nanos, task: Arc<dyn Task>) -> bool {
        let key = IndexKey {
            deadline,
            identity: identity(&task),
        };
        self.entries.insert(key, task).is_none()
    }

    /// Task with the smallest deadline, and that deadline.
    #[must_use]
    pub fn peek_min(&self) -> Option<(Nanos, &Arc<dyn Task>)> {
        self.entries
            .first_key_value()
            .map(|(key, task)| (key.deadline, task))
    }

    /// Remove and return the task with the smallest deadline.
    pub fn delete_min(&mut self) -> Option<(Nanos, Arc<dyn Task>)> {
        self.entries
            .pop_first()
            .map(|(key, task)| (key.deadline, task))
    }

    /// Remove the earliest task if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Nanos) -> Option<(Nanos, Arc<dyn Task>)> {
        match self.next_deadline() {
            Some(deadline) if deadline <= now => self.delete_min(),
            _ => None,
        }
    }

    /// Smallest deadline currently indexed.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Nanos> {
        self.entries.first_key_value().map(|(key, _)| key.deadline)
    }

    /// Number of indexed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry, returning how many were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.entries.len();
        self.entries.clear();
        discarded
    }
}

impl std::fmt::Debug for DeadlineIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlineIndex")
            .field("len", &self.entries.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Submitter;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct TestTask {
        id: u64,
        deadline: AtomicI64,
    }

    impl TestTask {
        fn new(id: u64, deadline: Nanos) -> Arc<Self> {
            Arc::new(Self {
                id,
                deadline: AtomicI64::new(deadline),
            })
        }
    }

    impl Task for TestTask {
        fn deadline(&self) -> Nanos {
            self.deadline.load(Ordering::Relaxed)
        }

        fn execute(self: Arc<Self>, _now: Nanos, _submitter: &Submitter) {}
    }

    fn pop_ids(index: &mut DeadlineIndex, ids: &[Arc<TestTask>]) -> Vec<u64> {
        let mut order = Vec::new();
        while let Some((_, task)) = index.delete_min() {
            let found = ids
                .iter()
                .find(|t| identity(&(Arc::clone(*t) as Arc<dyn Task>)) == identity(&task))
                .map(|t| t.id);
            order.push(found.unwrap());
        }
        order
    }

    #[test]
    fn test_delete_min_in_deadline_order() {
        let tasks = vec![
            TestTask::new(1, 300),
            TestTask::new(2, 100),
            TestTask::new(3, 500),
            TestTask::new(4, 200),
        ];
        let mut index = DeadlineIndex::new();
        for t in &tasks {
            assert!(index.insert(t.clone()));
        }

        assert_eq!(index.len(), 4);
        assert_eq!(index.next_deadline(), Some(100));
        assert_eq!(pop_ids(&mut index, &tasks), vec![2, 4, 1, 3]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_equal_deadlines_are_both_kept() {
        let a = TestTask::new(1, 100);
        let b = TestTask::new(2, 100);
        let mut index = DeadlineIndex::new();
        index.insert(a);
        index.insert(b);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_reinsert_same_task_same_deadline_replaces() {
        let a = TestTask::new(1, 100);
        let mut index = DeadlineIndex::new();
        assert!(index.insert(a.clone()));
        assert!(!index.insert(a.clone()));
        assert_eq!(index.len(), 1);

        // New deadline, new entry.
        a.deadline.store(200, Ordering::Relaxed);
        assert!(index.insert(a));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_deadline_is_captured_on_insert() {
        let a = TestTask::new(1, 100);
        let mut index = DeadlineIndex::new();
        index.insert(a.clone());
        a.deadline.store(900, Ordering::Relaxed);

        let (deadline, _) = index.peek_min().unwrap();
        assert_eq!(deadline, 100);
    }

    #[test]
    fn test_pop_due() {
        let mut index = DeadlineIndex::new();
        index.insert(TestTask::new(1, 100));
        index.insert(TestTask::new(2, 200));

        assert!(index.pop_due(99).is_none());
        assert_eq!(index.pop_due(100).map(|(d, _)| d), Some(100));
        assert!(index.pop_due(150).is_none());
        assert_eq!(index.pop_due(1_000).map(|(d, _)| d), Some(200));
        assert!(index.pop_due(1_000).is_none());
    }

    #[test]
    fn test_empty_index() {
        let mut index = DeadlineIndex::new();
        assert!(index.peek_min().is_none());
        assert!(index.delete_min().is_none());
        assert_eq!(index.next_deadline(), None);
        assert_eq!(index.clear(), 0);
    }
}
