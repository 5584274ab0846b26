//! Reserve classification: the three-tier backpressure policy.
//!
//! [`ReservePolicy`] maps the host's current resource reserve onto a
//! [`DispatchMode`] and a drain batch size. This is the central
//! backpressure mechanism: it sheds or delays low-value work first and
//! only denies service under true exhaustion.

use sluice_core::Priority;

use crate::config::BusConfig;

/// How emissions and drains behave at the current reserve level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchMode {
    /// Reserve at or above the low threshold: emission dispatches
    /// synchronously; drains run at the full batch size.
    Immediate,
    /// Reserve between the two thresholds: emission enqueues instead of
    /// executing; drains run at half the batch size.
    Deferred,
    /// Reserve below the critical threshold: sub-floor emissions are
    /// shed outright and draining is suspended until the reserve
    /// recovers.
    CriticalOnly,
}

/// Result of classifying a reserve sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// The dispatch mode for this sample.
    pub mode: DispatchMode,
    /// Allowed drain batch size (0 in [`DispatchMode::CriticalOnly`]).
    pub batch: usize,
}

/// The configured threshold ladder, extracted from [`BusConfig`].
///
/// Stateless: classification is a pure function of the reserve sample.
#[derive(Clone, Copy, Debug)]
pub struct ReservePolicy {
    low_threshold: u32,
    critical_threshold: u32,
    max_batch: usize,
    critical_floor: Priority,
}

impl ReservePolicy {
    /// Extract the policy from a validated config.
    pub fn from_config(config: &BusConfig) -> Self {
        Self {
            low_threshold: config.low_threshold,
            critical_threshold: config.critical_threshold,
            max_batch: config.max_events_per_batch,
            critical_floor: config.critical_floor,
        }
    }

    /// Classify a reserve sample into a mode and batch size.
    pub fn classify(&self, reserve: u32) -> Classification {
        if reserve >= self.low_threshold {
            Classification {
                mode: DispatchMode::Immediate,
                batch: self.max_batch,
            }
        } else if reserve >= self.critical_threshold {
            Classification {
                mode: DispatchMode::Deferred,
                batch: (self.max_batch / 2).max(1),
            }
        } else {
            Classification {
                mode: DispatchMode::CriticalOnly,
                batch: 0,
            }
        }
    }

    /// Whether an emission survives the critical-only admission gate.
    ///
    /// The immediate flag and the priority floor are independent
    /// exemptions; per-handler reserve gating still applies later.
    pub fn admits_when_critical(&self, priority: Priority, immediate: bool) -> bool {
        immediate || priority >= self.critical_floor
    }

    /// The configured critical priority floor.
    pub fn critical_floor(&self) -> Priority {
        self.critical_floor
    }
}
