//! Reusable handler and host fixtures.
//!
//! Four standard fixtures for bus and queue testing:
//!
//! - [`ScriptedHost`]: a host-signals stub the test mutates mid-run.
//! - [`RecordingHandler`]: appends its name to a shared invocation log.
//! - [`CountingHandler`]: bumps a shared counter on every delivery.
//! - [`FailingHandler`]: fails deterministically after N calls.
//!
//! Handlers are single-threaded by contract, so the fixtures use
//! `Rc`/`Cell` state freely.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use sluice_core::{CycleId, Delivery, EventHandler, HandlerError, HostSignals};

/// Host-signals stub with externally scripted cycle and reserve.
///
/// Construct behind an `Rc`, hand one clone to the bus and keep the
/// other, then adjust the reserve or advance the clock between calls:
///
/// ```
/// use std::rc::Rc;
/// use sluice_core::HostSignals;
/// use sluice_test_utils::ScriptedHost;
///
/// let host = Rc::new(ScriptedHost::new(5000));
/// let for_bus: Box<dyn HostSignals> = Box::new(Rc::clone(&host));
///
/// host.set_reserve(800);
/// host.advance(3);
/// assert_eq!(for_bus.reserve(), 800);
/// assert_eq!(for_bus.cycle().0, 3);
/// ```
#[derive(Debug)]
pub struct ScriptedHost {
    cycle: Cell<u64>,
    reserve: Cell<u32>,
}

impl ScriptedHost {
    /// Create a host at cycle 0 with the given reserve.
    pub fn new(reserve: u32) -> Self {
        Self {
            cycle: Cell::new(0),
            reserve: Cell::new(reserve),
        }
    }

    /// Set the reserve the bus will sample next.
    pub fn set_reserve(&self, reserve: u32) {
        self.reserve.set(reserve);
    }

    /// Advance the logical clock by `cycles`.
    pub fn advance(&self, cycles: u64) {
        self.cycle.set(self.cycle.get() + cycles);
    }

    /// Jump the logical clock to an absolute cycle.
    pub fn set_cycle(&self, cycle: u64) {
        self.cycle.set(cycle);
    }
}

impl HostSignals for ScriptedHost {
    fn cycle(&self) -> CycleId {
        CycleId(self.cycle.get())
    }

    fn reserve(&self) -> u32 {
        self.reserve.get()
    }
}

/// Appends its name to a shared log on every delivery.
///
/// Useful for asserting dispatch order across several handlers that
/// share one log.
pub struct RecordingHandler {
    pub name: String,
    log: Rc<RefCell<Vec<String>>>,
}

impl RecordingHandler {
    /// Create a handler that records into `log`.
    pub fn new(name: impl Into<String>, log: Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            name: name.into(),
            log,
        }
    }

    /// Create a fresh shared log.
    pub fn shared_log() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }
}

impl<P> EventHandler<P> for RecordingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&mut self, _delivery: &Delivery<'_, P>) -> Result<(), HandlerError> {
        self.log.borrow_mut().push(self.name.clone());
        Ok(())
    }
}

/// Bumps a shared counter on every delivery.
pub struct CountingHandler {
    pub name: String,
    count: Rc<Cell<usize>>,
}

impl CountingHandler {
    /// Create a handler that increments `count`.
    pub fn new(name: impl Into<String>, count: Rc<Cell<usize>>) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl<P> EventHandler<P> for CountingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&mut self, _delivery: &Delivery<'_, P>) -> Result<(), HandlerError> {
        self.count.set(self.count.get() + 1);
        Ok(())
    }
}

/// Fails deterministically after a configurable number of successes.
///
/// Useful for testing per-handler failure isolation in the dispatcher.
pub struct FailingHandler {
    pub name: String,
    pub succeed_count: usize,
    calls: Cell<usize>,
}

impl FailingHandler {
    /// Create a handler that succeeds `succeed_count` times then fails.
    pub fn new(name: impl Into<String>, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            succeed_count,
            calls: Cell::new(0),
        }
    }

    /// Create a handler that fails on every call.
    pub fn always(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }

    /// How many times `on_event` has been called.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<P> EventHandler<P> for FailingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&mut self, _delivery: &Delivery<'_, P>) -> Result<(), HandlerError> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if n >= self.succeed_count {
            return Err(HandlerError::failed(format!(
                "deliberate failure after {} successful calls",
                self.succeed_count
            )));
        }
        Ok(())
    }
}
