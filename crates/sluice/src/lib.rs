//! Sluice: priority- and resource-aware event dispatch for tick-bounded
//! cooperative hosts.
//!
//! This is the top-level facade crate that re-exports the public API
//! from the Sluice sub-crates. For most users, adding `sluice` as a
//! single dependency is sufficient.
//!
//! A sluice bus decouples event producers from consumers inside a host
//! that rations computation per cycle: handlers subscribe per topic
//! with a priority and an optional reserve requirement, and each
//! emission is dispatched immediately, deferred to a bounded backlog,
//! or shed, depending on where the host's resource reserve sits
//! relative to two configured thresholds.
//!
//! # Quick start
//!
//! ```rust
//! use sluice::prelude::*;
//!
//! // A host that always reports a flush reserve at cycle 0.
//! struct CalmHost;
//! impl HostSignals for CalmHost {
//!     fn cycle(&self) -> CycleId {
//!         CycleId(0)
//!     }
//!     fn reserve(&self) -> u32 {
//!         10_000
//!     }
//! }
//!
//! let mut bus: EventBus<&'static str> =
//!     EventBus::new(BusConfig::default(), Box::new(CalmHost)).unwrap();
//!
//! let greeter = handler_fn("greeter", |d: &Delivery<'_, &'static str>| {
//!     assert_eq!(*d.payload, "hello");
//!     Ok(())
//! });
//! bus.subscribe("greeting", Box::new(greeter), SubscribeOptions::default());
//!
//! let outcome = bus.emit("greeting", "hello", EmitOptions::default());
//! assert_eq!(outcome, EmitOutcome::Delivered { handlers_run: 1 });
//!
//! // Nothing was deferred at this reserve level.
//! assert_eq!(bus.process_queue(), 0);
//! assert_eq!(bus.stats().events_processed, 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `sluice-core` | IDs, the event model, errors, core traits |
//! | [`bus`] | `sluice-bus` | The dispatch engine, registry, queue, policy, stats |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`sluice-core`).
///
/// Contains the event model ([`types::PendingEvent`],
/// [`types::Delivery`], [`types::EmitOutcome`]), the [`types::Priority`]
/// scale, and the fundamental traits ([`types::EventHandler`],
/// [`types::HostSignals`]).
pub use sluice_core as types;

/// The dispatch engine (`sluice-bus`).
///
/// [`bus::EventBus`] is the user-facing API; the registry, queue,
/// policy, and stats components are public for hosts that want to
/// compose them differently.
pub use sluice_bus as bus;

/// Common imports for typical Sluice usage.
///
/// ```rust
/// use sluice::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use sluice_core::{
        handler_fn, CycleId, Delivery, DropReason, EmitOptions, EmitOutcome, EventHandler,
        FnHandler, HandlerError, HandlerId, HostSignals, PendingEvent, Priority,
    };

    // Engine
    pub use sluice_bus::{
        BusConfig, ConfigError, DispatchMode, EventBus, StatsSnapshot, SubscribeOptions,
        Subscription,
    };
}
