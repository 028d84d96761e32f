//! Deferred task queue.
//!
//! Work posted to a [`TaskQueue`] runs on a later tick of the owner's event
//! processing, never inside the call that posted it. Items posted while a
//! tick is draining the queue wait for the next tick.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique identifier for a deferred task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

/// A FIFO of deferred work items.
///
/// The queue is generic over the item so that the owner can describe its
/// deferred work as plain data and apply it with full access to its own state.
#[derive(Debug)]
pub struct TaskQueue<T> {
    tasks: VecDeque<(TaskId, T)>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    /// Create a new task queue.
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Post an item to run on the next tick.
    ///
    /// Returns the task ID that can be used to cancel the item.
    pub fn post(&mut self, task: T) -> TaskId {
        let id = next_task_id();
        self.tasks.push_back((id, task));
        id
    }

    /// Cancel a pending item.
    ///
    /// Returns `true` if the item was found and cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(pos) = self.tasks.iter().position(|(task_id, _)| *task_id == id) {
            self.tasks.remove(pos);
            true
        } else {
            false
        }
    }

    /// Drop every pending item for which `keep` returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.tasks.retain(|(_, task)| keep(task));
    }

    /// Check if there are any pending items.
    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Get the number of pending items.
    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Take every item queued so far, in posting order.
    pub fn take_ready(&mut self) -> Vec<T> {
        self.tasks.drain(..).map(|(_, task)| task).collect()
    }

    /// Drop all pending items.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_ready_preserves_order() {
        let mut queue = TaskQueue::new();
        queue.post("a");
        queue.post("b");
        queue.post("c");

        assert_eq!(queue.pending_count(), 3);
        assert_eq!(queue.take_ready(), vec!["a", "b", "c"]);
        assert!(!queue.has_pending());
    }

    #[test]
    fn test_cancel() {
        let mut queue = TaskQueue::new();
        let first = queue.post(1);
        queue.post(2);

        assert!(queue.cancel(first));
        assert!(!queue.cancel(first));
        assert_eq!(queue.take_ready(), vec![2]);
    }

    #[test]
    fn test_items_posted_after_drain_wait_for_next_tick() {
        let mut queue = TaskQueue::new();
        queue.post(1);

        let ready = queue.take_ready();
        for item in ready {
            queue.post(item + 1);
        }
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(queue.take_ready(), vec![2]);
    }

    #[test]
    fn test_retain() {
        let mut queue = TaskQueue::new();
        for i in 0..6 {
            queue.post(i);
        }
        queue.retain(|i| i % 2 == 0);
        assert_eq!(queue.take_ready(), vec![0, 2, 4]);
    }

    #[test]
    fn test_task_ids_are_unique() {
        let mut queue = TaskQueue::new();
        let a = queue.post(());
        let b = queue.post(());
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
    }
}
