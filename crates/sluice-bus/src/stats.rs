//! Dispatch statistics: additive counters driven by bus side effects.
//!
//! [`StatsCollector`] accumulates counts as the dispatcher and queue
//! operate; [`StatsSnapshot`] is the read-only view handed to
//! collaborators. Counters only reset via an explicit reset (bus
//! clear).

/// Read-only view of the bus counters at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Events currently waiting in the backlog.
    pub queue_size: usize,
    /// Events whose handlers were invoked (immediately or via drain).
    pub events_processed: u64,
    /// Events deferred to the backlog at emission time.
    pub events_deferred: u64,
    /// Events dropped for any reason (sum of the breakdown below).
    pub events_dropped: u64,
    /// Dropped because they aged out of the backlog.
    pub expired_drops: u64,
    /// Dropped in an overflow (evicted, or rejected at a full queue).
    pub overflow_drops: u64,
    /// Dropped at emission while the reserve was below critical.
    pub shed_drops: u64,
    /// Handler callbacks that returned an error (isolated, not fatal).
    pub handler_failures: u64,
}

/// Accumulates dispatch counters for one bus.
#[derive(Clone, Debug, Default)]
pub struct StatsCollector {
    processed: u64,
    deferred: u64,
    expired_drops: u64,
    overflow_drops: u64,
    shed_drops: u64,
    handler_failures: u64,
}

impl StatsCollector {
    /// Create a zeroed collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// One event's handlers were invoked.
    pub fn record_processed(&mut self) {
        self.processed += 1;
    }

    /// One event entered the backlog.
    pub fn record_deferred(&mut self) {
        self.deferred += 1;
    }

    /// `count` backlog entries aged out.
    pub fn record_expired(&mut self, count: u64) {
        self.expired_drops += count;
    }

    /// One event was lost to queue overflow (either side of an
    /// eviction decision).
    pub fn record_overflow(&mut self) {
        self.overflow_drops += 1;
    }

    /// One emission was shed below the critical reserve.
    pub fn record_shed(&mut self) {
        self.shed_drops += 1;
    }

    /// One handler callback returned an error.
    pub fn record_handler_failure(&mut self) {
        self.handler_failures += 1;
    }

    /// Snapshot the counters alongside the current backlog size.
    pub fn snapshot(&self, queue_size: usize) -> StatsSnapshot {
        StatsSnapshot {
            queue_size,
            events_processed: self.processed,
            events_deferred: self.deferred,
            events_dropped: self.expired_drops + self.overflow_drops + self.shed_drops,
            expired_drops: self.expired_drops,
            overflow_drops: self.overflow_drops,
            shed_drops: self.shed_drops,
            handler_failures: self.handler_failures,
        }
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
