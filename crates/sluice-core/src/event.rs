//! Event model: emission options, pending events, deliveries, and
//! per-emission outcomes.

use crate::id::{CycleId, Priority};

/// Options for a single `emit` call.
///
/// # Examples
///
/// ```
/// use sluice_core::{EmitOptions, Priority};
///
/// let opts = EmitOptions::with_priority(Priority::HIGH);
/// assert_eq!(opts.priority, Some(Priority::HIGH));
/// assert!(!opts.immediate);
///
/// let urgent = EmitOptions::immediate();
/// assert!(urgent.immediate);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Explicit priority override. `None` falls back to the per-topic
    /// default, then the global default.
    pub priority: Option<Priority>,
    /// Dispatch synchronously at emission time regardless of the current
    /// reserve, bypassing the backlog entirely.
    pub immediate: bool,
}

impl EmitOptions {
    /// Options with an explicit priority override.
    pub fn with_priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            immediate: false,
        }
    }

    /// Options flagged for immediate synchronous dispatch.
    pub fn immediate() -> Self {
        Self {
            priority: None,
            immediate: true,
        }
    }
}

/// An event held in the backlog between emission and drain.
///
/// Owned exclusively by the queue once enqueued; destroyed on dispatch,
/// age or overflow eviction, or bus clear.
///
/// `seq` is a queue-local monotonic arrival counter used as the FIFO
/// tiebreaker within one priority. `enqueued_at` is the host cycle at
/// emission time and is the basis for age eviction; the two are
/// distinct because many events can arrive within one cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingEvent<P> {
    /// The event-type key this event was emitted under.
    pub topic: String,
    /// Opaque payload, forwarded untouched to handlers.
    pub payload: P,
    /// Effective priority, resolved at emission time.
    pub priority: Priority,
    /// Host cycle at which the event was enqueued.
    pub enqueued_at: CycleId,
    /// Monotonic arrival sequence number, assigned by the queue.
    pub seq: u64,
    /// Whether the emission carried the immediate flag.
    pub immediate: bool,
}

/// What a handler observes for one invocation.
///
/// Borrows the topic and payload for the duration of the callback; the
/// priority, cycle, and reserve are the values sampled for this event's
/// dispatch (the reserve is sampled once per event, not per handler).
#[derive(Debug)]
pub struct Delivery<'a, P> {
    /// The topic the event was emitted under.
    pub topic: &'a str,
    /// The event payload.
    pub payload: &'a P,
    /// Effective priority resolved at emission time.
    pub priority: Priority,
    /// Host cycle at which this dispatch is running.
    pub cycle: CycleId,
    /// Reserve sampled for this event's dispatch.
    pub reserve: u32,
}

/// Why an emission was dropped instead of dispatched or enqueued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The reserve was below the critical threshold and the event's
    /// priority was below the critical floor.
    CriticalShed,
    /// The backlog was full and the event's priority did not strictly
    /// exceed the lowest priority already queued.
    QueueFull,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CriticalShed => write!(f, "shed below critical reserve"),
            Self::QueueFull => write!(f, "backlog full"),
        }
    }
}

/// Per-emission receipt returned by `emit`.
///
/// Load shedding is normal operation for this bus, so a dropped
/// emission is an outcome, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Dispatched synchronously at emission time.
    Delivered {
        /// Number of handlers actually invoked (after reserve gating).
        handlers_run: usize,
    },
    /// Deferred to the backlog for a later drain.
    Enqueued {
        /// Arrival sequence number assigned by the queue.
        seq: u64,
    },
    /// Dropped without dispatch.
    Dropped {
        /// Why the event was dropped.
        reason: DropReason,
    },
}

impl EmitOutcome {
    /// Whether the event was delivered or retained (not dropped).
    pub fn accepted(&self) -> bool {
        !matches!(self, Self::Dropped { .. })
    }
}
