//! Bounded priority backlog with deterministic ordering and age eviction.
//!
//! [`EventQueue`] buffers deferred events between emission and drain.
//! It enforces a capacity limit, assigns monotonic arrival sequence
//! numbers, discards age-expired entries, and returns drained batches
//! in a deterministic order.
//!
//! # Ordering
//!
//! Drains are sorted by the composite key `(priority desc, seq asc)`:
//! higher-priority events deliver first, and events of equal priority
//! deliver in arrival order (FIFO).
//!
//! # Overflow
//!
//! At capacity, the single lowest-priority entry (oldest first within
//! that priority) is evicted to make room, but only for a strictly
//! higher-priority newcomer. An incoming event that does not beat the
//! current minimum is rejected instead.

use std::cmp::Reverse;

use sluice_core::{CycleId, PendingEvent};

/// Result of a single [`enqueue()`](EventQueue::enqueue) call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Stored without displacing anything.
    Stored {
        /// Arrival sequence number assigned to the event.
        seq: u64,
    },
    /// Stored after evicting the lowest-priority oldest entry.
    StoredAfterEviction {
        /// Arrival sequence number assigned to the event.
        seq: u64,
    },
    /// The queue was full and the event did not outrank the current
    /// minimum; the incoming event was dropped.
    Rejected,
}

/// Result of draining the queue.
#[derive(Debug)]
pub struct DrainOutcome<P> {
    /// Up to `max_count` events in delivery order.
    pub events: Vec<PendingEvent<P>>,
    /// Number of age-expired entries discarded during this pass.
    pub expired: usize,
}

/// Bounded backlog of deferred events.
///
/// Accepts events via [`enqueue()`](EventQueue::enqueue), assigns
/// monotonic arrival sequence numbers, and produces sorted,
/// age-filtered batches via [`drain()`](EventQueue::drain). Entries
/// not drained stay queued for the next pass.
pub struct EventQueue<P> {
    entries: Vec<PendingEvent<P>>,
    capacity: usize,
    max_age: u64,
    next_seq: u64,
}

/// Delivery order: descending priority, then ascending arrival.
fn drain_key<P>(event: &PendingEvent<P>) -> (Reverse<sluice_core::Priority>, u64) {
    (Reverse(event.priority), event.seq)
}

impl<P> EventQueue<P> {
    /// Create a new queue.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` or `max_age` is zero; both are rejected
    /// earlier by config validation.
    pub fn new(capacity: usize, max_age: u64) -> Self {
        assert!(capacity > 0, "EventQueue capacity must be at least 1");
        assert!(max_age > 0, "EventQueue max_age must be at least 1");
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            max_age,
            next_seq: 0,
        }
    }

    /// Enqueue one event, assigning its arrival sequence number.
    ///
    /// The sequence counter is queue-local and persists across calls,
    /// overwriting whatever value the caller may have set on
    /// `event.seq`. At capacity the overflow policy above applies.
    pub fn enqueue(&mut self, mut event: PendingEvent<P>) -> EnqueueOutcome {
        let mut evicted = false;
        if self.entries.len() >= self.capacity {
            // Victim: lowest priority, oldest arrival within it.
            let victim = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| (e.priority, e.seq))
                .map(|(i, _)| i)
                .expect("capacity >= 1 implies a non-empty full queue");
            if event.priority <= self.entries[victim].priority {
                return EnqueueOutcome::Rejected;
            }
            // Order is restored by the sort in drain().
            self.entries.swap_remove(victim);
            evicted = true;
        }

        event.seq = self.next_seq;
        self.next_seq += 1;
        let seq = event.seq;
        self.entries.push(event);

        if evicted {
            EnqueueOutcome::StoredAfterEviction { seq }
        } else {
            EnqueueOutcome::Stored { seq }
        }
    }

    /// Drain up to `max_count` events in delivery order.
    ///
    /// Age-expired entries (strictly older than `max_age` cycles) are
    /// discarded first and counted in [`DrainOutcome::expired`]; an
    /// entry exactly `max_age` cycles old is still valid. Entries
    /// beyond `max_count` remain queued.
    pub fn drain(&mut self, max_count: usize, now: CycleId) -> DrainOutcome<P> {
        let mut expired = 0;
        let max_age = self.max_age;
        self.entries.retain(|e| {
            if now.cycles_since(e.enqueued_at) > max_age {
                expired += 1;
                false
            } else {
                true
            }
        });

        self.entries.sort_unstable_by_key(drain_key);
        let take = max_count.min(self.entries.len());
        let events: Vec<PendingEvent<P>> = self.entries.drain(..take).collect();

        DrainOutcome { events, expired }
    }

    /// Number of events currently buffered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the backlog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of events this queue can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard all pending events.
    ///
    /// The arrival sequence counter is not reset, so sequence numbers
    /// stay unique across a bus clear.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<P> std::fmt::Debug for EventQueue<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("max_age", &self.max_age)
            .field("next_seq", &self.next_seq)
            .finish()
    }
}
