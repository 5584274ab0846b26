//! Error types for the Sluice event dispatch engine.
//!
//! Handler failures are the only runtime error in the system: capacity
//! exhaustion, stale-event expiry, and handle misuse are all handled as
//! counted outcomes, never surfaced as errors.

use std::error::Error;
use std::fmt;

/// Error returned by a handler's `on_event` callback.
///
/// Caught per handler by the dispatcher: one failing consumer never
/// blocks delivery to the remaining handlers for that event or to the
/// remaining events in a drain batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler's callback failed.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::ExecutionFailed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
        }
    }
}

impl Error for HandlerError {}
