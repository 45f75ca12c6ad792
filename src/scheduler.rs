use core::cmp::Ordering;
use core::time::Duration;
use std::collections::BinaryHeap;

/// Delayed continuation queue for the single-threaded update loop.
/// Replaces ambient engine timers: everything scheduled here only fires
/// when [`Scheduler::advance`] is driven with elapsed time.
///
/// Entries due at the same instant pop in scheduling order, so per-tile
/// continuations stay FIFO. [`Scheduler::cancel_all`] drops every pending
/// entry, which keeps a torn-down level's continuations from touching its
/// successor.
#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Entry<T>>,
    now_us: u64,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            now_us: 0,
            next_seq: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration, action: T) {
        let due_us = self.now_us + delay.as_micros() as u64;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry {
            due_us,
            seq,
            action,
        });
    }

    /// Moves time forward and pops every continuation now due, in firing
    /// order.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now_us += dt.as_micros() as u64;

        let mut due = Vec::new();
        while let Some(entry) = self.queue.peek() {
            if entry.due_us > self.now_us {
                break;
            }
            due.push(self.queue.pop().unwrap().action);
        }
        due
    }

    /// Invalidates every pending continuation.
    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[derive(Clone, Debug)]
struct Entry<T> {
    due_us: u64,
    seq: u64,
    action: T,
}

// Manual ordering: earliest due time first, then scheduling order. The
// heap is a max-heap so comparisons are reversed.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due_us, other.seq).cmp(&(self.due_us, self.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        (self.due_us, self.seq) == (other.due_us, other.seq)
    }
}

impl<T> Eq for Entry<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn actions_fire_only_once_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(10 * MS, 'a');
        scheduler.schedule(20 * MS, 'b');

        assert_eq!(scheduler.advance(5 * MS), vec![]);
        assert_eq!(scheduler.advance(5 * MS), vec!['a']);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.advance(100 * MS), vec!['b']);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn same_instant_actions_keep_scheduling_order() {
        let mut scheduler = Scheduler::new();
        for i in 0..5 {
            scheduler.schedule(10 * MS, i);
        }
        assert_eq!(scheduler.advance(10 * MS), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn ordering_interleaves_by_due_time_then_sequence() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(30 * MS, 'c');
        scheduler.schedule(10 * MS, 'a');
        scheduler.schedule(20 * MS, 'b');
        assert_eq!(scheduler.advance(30 * MS), vec!['a', 'b', 'c']);
    }

    #[test]
    fn cancel_all_drops_pending_actions() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(10 * MS, 'a');
        scheduler.cancel_all();
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.advance(20 * MS), vec![]);

        // The queue still works after a teardown.
        scheduler.schedule(10 * MS, 'b');
        assert_eq!(scheduler.advance(10 * MS), vec!['b']);
    }

    #[test]
    fn delays_accumulate_across_advances() {
        let mut scheduler = Scheduler::new();
        scheduler.advance(100 * MS);
        scheduler.schedule(10 * MS, 'a');
        assert_eq!(scheduler.advance(9 * MS), vec![]);
        assert_eq!(scheduler.advance(MS), vec!['a']);
    }
}
