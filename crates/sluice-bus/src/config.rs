//! Bus configuration, validation, and error types.
//!
//! [`BusConfig`] is the builder-input for constructing an event bus.
//! [`validate()`](BusConfig::validate) checks structural invariants at
//! startup; [`EventBus::new`](crate::EventBus::new) calls it before
//! touching any other state.

use std::error::Error;
use std::fmt;

use indexmap::IndexMap;
use sluice_core::Priority;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`BusConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `critical_threshold` is not strictly below `low_threshold`.
    ThresholdOrder {
        /// The configured critical threshold.
        critical: u32,
        /// The configured low threshold.
        low: u32,
    },
    /// `max_events_per_batch` is zero.
    ZeroBatch,
    /// `max_queue_size` is zero.
    ZeroQueue,
    /// `max_event_age` is zero.
    ZeroAge,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThresholdOrder { critical, low } => write!(
                f,
                "critical_threshold {critical} must be strictly below low_threshold {low}"
            ),
            Self::ZeroBatch => write!(f, "max_events_per_batch must be at least 1"),
            Self::ZeroQueue => write!(f, "max_queue_size must be at least 1"),
            Self::ZeroAge => write!(f, "max_event_age must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

// ── BusConfig ──────────────────────────────────────────────────────

/// Complete configuration for constructing an event bus.
///
/// Constructed once and immutable thereafter. The two thresholds split
/// the reserve range into the three dispatch modes; the remaining
/// fields bound the backlog and tune defaults.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Reserve at or above this dispatches synchronously at emission.
    /// Default: 2000.
    pub low_threshold: u32,
    /// Reserve below this sheds sub-critical emissions and suspends
    /// draining entirely. Must be strictly below `low_threshold`.
    /// Default: 1000.
    pub critical_threshold: u32,
    /// Drain batch size at full reserve; halved (minimum 1) between the
    /// two thresholds. Default: 50.
    pub max_events_per_batch: usize,
    /// Maximum backlog size. Excess is handled by eviction, never
    /// silent merging. Default: 1024.
    pub max_queue_size: usize,
    /// Maximum event age in cycles. Older backlog entries are dropped,
    /// not delivered. Default: 100.
    pub max_event_age: u64,
    /// Minimum priority exempt from emission-time shedding when the
    /// reserve is below `critical_threshold`. Default:
    /// [`Priority::CRITICAL`].
    pub critical_floor: Priority,
    /// Effective priority when neither the emission nor the topic table
    /// supplies one. Default: [`Priority::NORMAL`].
    pub default_priority: Priority,
    /// Per-topic default priorities, consulted before
    /// `default_priority`. Insertion order is preserved for
    /// deterministic debugging output. Default: empty.
    pub topic_priorities: IndexMap<String, Priority>,
    /// Whether the bus emits `log` records (handler failures, shed and
    /// eviction events). Default: true.
    pub logging_enabled: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            low_threshold: 2000,
            critical_threshold: 1000,
            max_events_per_batch: 50,
            max_queue_size: 1024,
            max_event_age: 100,
            critical_floor: Priority::CRITICAL,
            default_priority: Priority::NORMAL,
            topic_priorities: IndexMap::new(),
            logging_enabled: true,
        }
    }
}

impl BusConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.critical_threshold >= self.low_threshold {
            return Err(ConfigError::ThresholdOrder {
                critical: self.critical_threshold,
                low: self.low_threshold,
            });
        }
        if self.max_events_per_batch == 0 {
            return Err(ConfigError::ZeroBatch);
        }
        if self.max_queue_size == 0 {
            return Err(ConfigError::ZeroQueue);
        }
        if self.max_event_age == 0 {
            return Err(ConfigError::ZeroAge);
        }
        Ok(())
    }

    /// The default priority for `topic`, falling back to the global
    /// default when the topic has no table entry.
    pub fn priority_for(&self, topic: &str) -> Priority {
        self.topic_priorities
            .get(topic)
            .copied()
            .unwrap_or(self.default_priority)
    }
}
