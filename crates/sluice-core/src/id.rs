//! Strongly-typed identifiers and the [`Priority`] scale.

use std::fmt;

/// Monotonically increasing host cycle counter.
///
/// One unit corresponds to one discrete unit of host execution time.
/// The host advances it; the bus only reads it, using it as the basis
/// for event-age eviction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleId(pub u64);

impl CycleId {
    /// Number of whole cycles elapsed since `earlier`.
    ///
    /// Saturates at zero if `earlier` is in the future, which can only
    /// happen if the host clock violates monotonicity.
    pub fn cycles_since(self, earlier: CycleId) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CycleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Unique identity of a subscribed handler.
///
/// Allocated from a bus-local monotonic counter at subscribe time.
/// Never reused within one bus, even after unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for HandlerId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Dispatch priority. Higher values are more important.
///
/// Handlers fire in descending priority order within one topic, and the
/// backlog drains in descending priority order. Any `i32` is a valid
/// priority; the named levels below are conventional anchor points.
///
/// # Examples
///
/// ```
/// use sluice_core::Priority;
///
/// assert!(Priority::CRITICAL > Priority::HIGH);
/// assert!(Priority::HIGH > Priority::NORMAL);
/// assert_eq!(Priority::NORMAL, Priority(25));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Priority(pub i32);

impl Priority {
    /// Background work: shed first under pressure.
    pub const LOW: Priority = Priority(10);
    /// The global default for handlers and emissions.
    pub const NORMAL: Priority = Priority(25);
    /// Elevated work that should jump the backlog.
    pub const HIGH: Priority = Priority(50);
    /// The conventional critical floor: exempt from emission-time
    /// shedding when the reserve is below the critical threshold.
    pub const CRITICAL: Priority = Priority(75);
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Priority {
    fn from(v: i32) -> Self {
        Self(v)
    }
}
