//! # Retry queue: the ordered backlog of not-yet-succeeded tasks.
//!
//! A FIFO of `(task, attempt)` entries consumed in batches and refilled
//! on failure.
//!
//! ## Invariants
//! - A task appears **at most once** in the queue at any instant: a
//!   task is either waiting here, in flight in the current batch, or
//!   done for the round.
//! - A failed task re-enters at the **back**, never ahead of untried
//!   tasks — round-robin fairness across repeated retries.
//! - Seeding preserves the original slot order, so first attempts run
//!   in task-list order.
//!
//! Rounds are stateless with respect to each other: every round reseeds
//! the queue from the full task list regardless of earlier outcomes.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::tasks::BidTask;

/// One backlog entry: the task plus its per-round attempt counter.
#[derive(Clone, Debug)]
pub struct QueuedTask {
    /// The task descriptor.
    pub task: BidTask,
    /// Attempt number of the *next* execution (1-based).
    pub attempt: u32,
}

/// FIFO backlog with batched dequeue.
///
/// Interior mutability behind a mutex: completing tasks of one batch
/// may enqueue concurrently while belonging to the same scheduler.
#[derive(Debug, Default)]
pub struct RetryQueue {
    inner: Mutex<VecDeque<QueuedTask>>,
}

impl RetryQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue seeded with every task, in slice order, each at
    /// attempt 1.
    pub fn seeded(tasks: &[BidTask]) -> Self {
        let inner = tasks
            .iter()
            .cloned()
            .map(|task| QueuedTask { task, attempt: 1 })
            .collect();
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Appends an entry to the back.
    pub fn enqueue(&self, entry: QueuedTask) {
        self.inner.lock().expect("retry queue poisoned").push_back(entry);
    }

    /// Atomically removes and returns up to `limit` entries from the
    /// front, preserving order.
    pub fn dequeue_batch(&self, limit: usize) -> Vec<QueuedTask> {
        let mut q = self.inner.lock().expect("retry queue poisoned");
        let n = limit.min(q.len());
        q.drain(..n).collect()
    }

    /// Whether any entries remain.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().expect("retry queue poisoned").is_empty()
    }

    /// Number of waiting entries.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("retry queue poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks(n: u32) -> Vec<BidTask> {
        (0..n)
            .map(|i| BidTask::new(i, format!("https://a.example/{i}"), "C", 100))
            .collect()
    }

    #[test]
    fn seeded_preserves_slot_order() {
        let q = RetryQueue::seeded(&tasks(3));
        let batch = q.dequeue_batch(10);
        let slots: Vec<u32> = batch.iter().map(|e| e.task.slot()).collect();
        assert_eq!(slots, vec![0, 1, 2]);
        assert!(batch.iter().all(|e| e.attempt == 1));
        assert!(q.is_empty());
    }

    #[test]
    fn dequeue_respects_limit() {
        let q = RetryQueue::seeded(&tasks(5));
        assert_eq!(q.dequeue_batch(2).len(), 2);
        assert_eq!(q.len(), 3);
        assert_eq!(q.dequeue_batch(10).len(), 3);
        assert!(q.dequeue_batch(1).is_empty());
    }

    #[test]
    fn retried_task_goes_behind_untried_tasks() {
        let ts = tasks(3);
        let q = RetryQueue::seeded(&ts);
        let first = q.dequeue_batch(1).remove(0);
        // slot 0 failed; it re-enters behind slots 1 and 2
        q.enqueue(QueuedTask {
            task: first.task,
            attempt: first.attempt + 1,
        });
        let order: Vec<u32> = q.dequeue_batch(10).iter().map(|e| e.task.slot()).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }
}
