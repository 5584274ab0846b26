//! Core abstraction traits: host signals and event handlers.

use std::rc::Rc;

use crate::error::HandlerError;
use crate::event::Delivery;
use crate::id::CycleId;

/// External signals the bus consumes from its host.
///
/// The reserve is a scalar representing how much computation budget is
/// available to the host for the present cycle; the cycle counter is
/// the host's monotonically increasing logical clock. The bus samples
/// both at the start of every `emit`/`process_queue` call and re-samples
/// the reserve once per drained event. It never caches either value
/// across calls.
///
/// Injected explicitly at bus construction so the core stays testable
/// and free of hidden environment coupling.
pub trait HostSignals {
    /// The host's current logical cycle.
    fn cycle(&self) -> CycleId;

    /// The host's current resource reserve.
    fn reserve(&self) -> u32;
}

impl<H: HostSignals + ?Sized> HostSignals for Box<H> {
    fn cycle(&self) -> CycleId {
        (**self).cycle()
    }

    fn reserve(&self) -> u32 {
        (**self).reserve()
    }
}

impl<H: HostSignals + ?Sized> HostSignals for Rc<H> {
    fn cycle(&self) -> CycleId {
        (**self).cycle()
    }

    fn reserve(&self) -> u32 {
        (**self).reserve()
    }
}

/// A consumer of events on one topic.
///
/// # Contract
///
/// - `on_event` runs to completion before control returns to the
///   dispatcher; it must not assume it can re-enter the bus.
/// - A returned error is caught, logged, and counted by the dispatcher;
///   it never propagates to the emitter or to sibling handlers.
/// - No `Send` bound: execution is single-threaded by contract, so
///   handlers may freely hold `Rc`/`Cell` state.
///
/// # Object safety
///
/// This trait is object-safe; the registry stores handlers as
/// `Box<dyn EventHandler<P>>`.
///
/// # Examples
///
/// A handler that tallies payload bytes:
///
/// ```
/// use sluice_core::{Delivery, EventHandler, HandlerError};
///
/// struct ByteTally {
///     total: usize,
/// }
///
/// impl EventHandler<Vec<u8>> for ByteTally {
///     fn name(&self) -> &str {
///         "byte_tally"
///     }
///
///     fn on_event(&mut self, delivery: &Delivery<'_, Vec<u8>>) -> Result<(), HandlerError> {
///         self.total += delivery.payload.len();
///         Ok(())
///     }
/// }
///
/// let handler = ByteTally { total: 0 };
/// assert_eq!(handler.name(), "byte_tally");
/// ```
pub trait EventHandler<P> {
    /// Human-readable name for failure logging.
    fn name(&self) -> &str;

    /// Consume one event delivery.
    fn on_event(&mut self, delivery: &Delivery<'_, P>) -> Result<(), HandlerError>;
}

/// Adapter turning an `FnMut` closure into an [`EventHandler`].
///
/// Built via [`handler_fn`].
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<P, F> EventHandler<P> for FnHandler<F>
where
    F: FnMut(&Delivery<'_, P>) -> Result<(), HandlerError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&mut self, delivery: &Delivery<'_, P>) -> Result<(), HandlerError> {
        (self.f)(delivery)
    }
}

/// Wrap a closure as a named [`EventHandler`].
///
/// # Examples
///
/// ```
/// use sluice_core::{handler_fn, CycleId, Delivery, EventHandler, Priority};
///
/// let mut seen = 0u32;
/// {
///     let mut handler = handler_fn("counter", |d: &Delivery<'_, u32>| {
///         seen += *d.payload;
///         Ok(())
///     });
///     let payload = 5u32;
///     let delivery = Delivery {
///         topic: "demo",
///         payload: &payload,
///         priority: Priority::NORMAL,
///         cycle: CycleId(0),
///         reserve: 1000,
///     };
///     handler.on_event(&delivery).unwrap();
/// }
/// assert_eq!(seen, 5);
/// ```
pub fn handler_fn<P, F>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    F: FnMut(&Delivery<'_, P>) -> Result<(), HandlerError>,
{
    FnHandler {
        name: name.into(),
        f,
    }
}
