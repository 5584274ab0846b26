//! Test utilities for Sluice development.
//!
//! Not published; shared by unit, integration, and bench code across
//! the workspace.

#![forbid(unsafe_code)]

mod fixtures;

pub use fixtures::{CountingHandler, FailingHandler, RecordingHandler, ScriptedHost};
