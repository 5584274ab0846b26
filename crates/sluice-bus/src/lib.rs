//! Dispatch engine for Sluice event buses.
//!
//! Provides the top-level [`EventBus`] that decouples event producers
//! from consumers inside a tick-bounded, cooperative host: handler
//! registration with priorities, reserve-driven immediate/deferred
//! dispatch, a bounded priority backlog with age eviction, and
//! observable dispatch statistics.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod policy;
pub mod queue;
pub mod registry;
pub mod stats;

pub use config::{BusConfig, ConfigError};
pub use dispatch::EventBus;
pub use policy::{Classification, DispatchMode, ReservePolicy};
pub use queue::{DrainOutcome, EnqueueOutcome, EventQueue};
pub use registry::{HandlerRegistry, SubscribeOptions, Subscription};
pub use stats::{StatsCollector, StatsSnapshot};
