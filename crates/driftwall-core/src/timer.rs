//! Deterministic cancellable timer queue.
//!
//! The engine is single-threaded and cooperative: every state transition
//! happens inside a discrete host-driven callback. Time is an explicit
//! `Duration` since mount, so hosts drive the queue with wall time and tests
//! drive it with simulated time.
//!
//! Cancellation is lazy: `cancel` removes the payload and the heap entry is
//! skipped when it surfaces. `clear` is the teardown guarantee — after it
//! returns, no timer fires, ever.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Handle for one scheduled timer. Ids are never reused within a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Min-heap of `(deadline, payload)` entries with O(1) cancellation.
#[derive(Debug)]
pub struct TimerQueue<E> {
    heap: BinaryHeap<Reverse<(Duration, u64)>>,
    pending: HashMap<u64, E>,
    next_id: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: HashMap::new(),
            next_id: 0,
        }
    }

    /// Schedule `event` to fire at `deadline`.
    pub fn schedule(&mut self, deadline: Duration, event: E) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.heap.push(Reverse((deadline, id)));
        self.pending.insert(id, event);
        TimerId(id)
    }

    /// Cancel a pending timer. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id.0).is_some()
    }

    /// Cancel every pending timer.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.pending.clear();
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Deadline of the earliest pending timer, if any.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.drop_stale();
        self.heap.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Pop the earliest timer whose deadline is `<= now`.
    ///
    /// Callers loop on this until it returns `None`; firing order between
    /// equal deadlines follows scheduling order.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, E)> {
        self.drop_stale();
        let Reverse((deadline, id)) = *self.heap.peek()?;
        if deadline > now {
            return None;
        }
        self.heap.pop();
        let event = self
            .pending
            .remove(&id)
            .expect("stale entries dropped above");
        Some((TimerId(id), event))
    }

    /// Drop heap entries whose payloads were cancelled.
    fn drop_stale(&mut self) {
        while let Some(Reverse((_, id))) = self.heap.peek() {
            if self.pending.contains_key(id) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(30 * MS, "c");
        q.schedule(10 * MS, "a");
        q.schedule(20 * MS, "b");

        let mut fired = Vec::new();
        while let Some((_, e)) = q.pop_due(100 * MS) {
            fired.push(e);
        }
        assert_eq!(fired, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pop_due_respects_now() {
        let mut q = TimerQueue::new();
        q.schedule(10 * MS, "a");
        q.schedule(20 * MS, "b");

        assert_eq!(q.pop_due(15 * MS).map(|(_, e)| e), Some("a"));
        assert_eq!(q.pop_due(15 * MS), None);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_equal_deadlines_fire_in_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(10 * MS, "first");
        q.schedule(10 * MS, "second");
        assert_eq!(q.pop_due(10 * MS).map(|(_, e)| e), Some("first"));
        assert_eq!(q.pop_due(10 * MS).map(|(_, e)| e), Some("second"));
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut q = TimerQueue::new();
        let id = q.schedule(10 * MS, "a");
        q.schedule(20 * MS, "b");

        assert!(q.cancel(id));
        assert!(!q.cancel(id), "double cancel is a no-op");
        assert_eq!(q.pop_due(100 * MS).map(|(_, e)| e), Some("b"));
        assert_eq!(q.pop_due(100 * MS), None);
    }

    #[test]
    fn test_clear_cancels_everything() {
        let mut q = TimerQueue::new();
        q.schedule(10 * MS, 1);
        q.schedule(20 * MS, 2);
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.pop_due(Duration::from_secs(3600)), None);
        assert_eq!(q.next_deadline(), None);
    }

    #[test]
    fn test_next_deadline_skips_cancelled() {
        let mut q = TimerQueue::new();
        let early = q.schedule(10 * MS, "a");
        q.schedule(20 * MS, "b");
        q.cancel(early);
        assert_eq!(q.next_deadline(), Some(20 * MS));
    }

    #[test]
    fn test_ids_not_reused() {
        let mut q = TimerQueue::new();
        let a = q.schedule(10 * MS, ());
        q.pop_due(10 * MS);
        let b = q.schedule(10 * MS, ());
        assert_ne!(a, b);
    }
}
