//! The dispatcher: emission routing and backlog draining.
//!
//! [`EventBus`] wires the registry, policy, queue, and stats into the
//! user-facing API. Every call samples the host signals afresh; the
//! bus never caches the reserve or the clock across calls.
//!
//! # Single-threaded cooperation
//!
//! One host cycle drives exactly one [`process_queue()`](EventBus::process_queue)
//! call plus any number of synchronous [`emit()`](EventBus::emit) calls.
//! Nothing blocks or suspends; handler callbacks run to completion
//! before control returns to the dispatcher. All mutating methods take
//! `&mut self`, so the borrow checker enforces the no-reentrancy
//! contract at compile time.
//!
//! # Ordering
//!
//! Ordering guarantees hold within synchronous dispatch and within
//! queue drains, but not across the immediate/deferred boundary: a
//! low-priority event dispatched immediately during a high-reserve
//! moment may run before a higher-priority event queued earlier while
//! the reserve was low.

use log::{debug, warn};
use sluice_core::{
    CycleId, Delivery, DropReason, EmitOptions, EmitOutcome, EventHandler, HostSignals,
    PendingEvent, Priority,
};

use crate::config::{BusConfig, ConfigError};
use crate::policy::{DispatchMode, ReservePolicy};
use crate::queue::{EnqueueOutcome, EventQueue};
use crate::registry::{HandlerRegistry, SubscribeOptions, Subscription};
use crate::stats::{StatsCollector, StatsSnapshot};

/// Priority- and resource-aware event bus for a tick-bounded host.
///
/// Decouples producers from consumers: producers [`emit()`](EventBus::emit),
/// consumers [`subscribe()`](EventBus::subscribe), and the host drives
/// one [`process_queue()`](EventBus::process_queue) per cycle. The
/// reserve level decides, at emission time, whether an event runs
/// immediately, waits in the bounded backlog, or is shed.
///
/// # Example
///
/// ```ignore
/// let mut bus = EventBus::new(BusConfig::default(), host)?;
/// let sub = bus.subscribe("colony.attacked", handler, SubscribeOptions::default());
/// bus.emit("colony.attacked", payload, EmitOptions::immediate());
/// let delivered = bus.process_queue();
/// ```
pub struct EventBus<P> {
    config: BusConfig,
    policy: ReservePolicy,
    registry: HandlerRegistry<P>,
    queue: EventQueue<P>,
    stats: StatsCollector,
    host: Box<dyn HostSignals>,
}

impl<P> EventBus<P> {
    /// Construct a bus from a config and the host's signal accessor.
    ///
    /// Validates the configuration before building any state.
    /// Consumes the `BusConfig`.
    pub fn new(config: BusConfig, host: Box<dyn HostSignals>) -> Result<Self, ConfigError> {
        config.validate()?;
        let policy = ReservePolicy::from_config(&config);
        let queue = EventQueue::new(config.max_queue_size, config.max_event_age);
        Ok(Self {
            config,
            policy,
            registry: HandlerRegistry::new(),
            queue,
            stats: StatsCollector::new(),
            host,
        })
    }

    /// Register a handler for `topic`.
    pub fn subscribe(
        &mut self,
        topic: impl Into<String>,
        handler: Box<dyn EventHandler<P>>,
        options: SubscribeOptions,
    ) -> Subscription {
        self.registry.subscribe(topic, handler, options)
    }

    /// Remove a handler; unknown handles are a no-op.
    pub fn unsubscribe(&mut self, subscription: &Subscription) {
        self.registry.unsubscribe(subscription);
    }

    /// Emit one event.
    ///
    /// Samples the host signals once, resolves the effective priority
    /// (explicit override, else per-topic default, else global
    /// default), then routes: synchronous dispatch when the reserve is
    /// high or the immediate flag is set, the backlog when the reserve
    /// is merely low, a counted drop when the reserve is critical and
    /// the priority is below the critical floor.
    ///
    /// Emitting a topic with no subscribers is not an error; an
    /// immediate dispatch simply invokes zero handlers.
    pub fn emit(&mut self, topic: &str, payload: P, options: EmitOptions) -> EmitOutcome {
        let cycle = self.host.cycle();
        let reserve = self.host.reserve();
        let priority = options
            .priority
            .unwrap_or_else(|| self.config.priority_for(topic));
        let classification = self.policy.classify(reserve);

        if options.immediate || classification.mode == DispatchMode::Immediate {
            let handlers_run = self.fan_out(topic, &payload, priority, cycle, reserve);
            self.stats.record_processed();
            return EmitOutcome::Delivered { handlers_run };
        }

        if classification.mode == DispatchMode::CriticalOnly
            && !self.policy.admits_when_critical(priority, options.immediate)
        {
            self.stats.record_shed();
            if self.config.logging_enabled {
                debug!(
                    "shed '{topic}' (priority {priority}, floor {})",
                    self.policy.critical_floor()
                );
            }
            return EmitOutcome::Dropped {
                reason: DropReason::CriticalShed,
            };
        }

        let event = PendingEvent {
            topic: topic.to_string(),
            payload,
            priority,
            enqueued_at: cycle,
            seq: 0,
            immediate: options.immediate,
        };
        match self.queue.enqueue(event) {
            EnqueueOutcome::Stored { seq } => {
                self.stats.record_deferred();
                EmitOutcome::Enqueued { seq }
            }
            EnqueueOutcome::StoredAfterEviction { seq } => {
                // The displaced entry is the drop, not the newcomer.
                self.stats.record_deferred();
                self.stats.record_overflow();
                if self.config.logging_enabled {
                    debug!("backlog full: evicted lowest-priority entry for '{topic}'");
                }
                EmitOutcome::Enqueued { seq }
            }
            EnqueueOutcome::Rejected => {
                self.stats.record_overflow();
                if self.config.logging_enabled {
                    debug!("backlog full: dropped '{topic}' (priority {priority})");
                }
                EmitOutcome::Dropped {
                    reason: DropReason::QueueFull,
                }
            }
        }
    }

    /// Drain one batch from the backlog; returns events processed.
    ///
    /// Classifies the current reserve first: a critical reserve skips
    /// draining entirely. Otherwise up to the classified batch size is
    /// drained in priority order; age-expired entries encountered
    /// during the pass are counted as drops, never processed.
    ///
    /// The reserve that gates each event's handlers is re-sampled once
    /// per drained event, not per handler; resource state is treated
    /// as stable across one event's fan-out.
    pub fn process_queue(&mut self) -> usize {
        let cycle = self.host.cycle();
        let reserve = self.host.reserve();
        let classification = self.policy.classify(reserve);
        if classification.mode == DispatchMode::CriticalOnly {
            return 0;
        }

        let drained = self.queue.drain(classification.batch, cycle);
        if drained.expired > 0 {
            self.stats.record_expired(drained.expired as u64);
            if self.config.logging_enabled {
                debug!("expired {} backlog entries at cycle {cycle}", drained.expired);
            }
        }

        let mut processed = 0;
        for event in drained.events {
            let event_reserve = self.host.reserve();
            self.fan_out(
                &event.topic,
                &event.payload,
                event.priority,
                cycle,
                event_reserve,
            );
            self.stats.record_processed();
            processed += 1;
        }
        processed
    }

    /// Invoke `topic`'s handlers in dispatch order for one event.
    ///
    /// Each handler is gated by its reserve requirement against the
    /// sample taken for this event. A handler error is caught, counted,
    /// and logged; it never blocks the remaining handlers. Returns the
    /// number of handlers invoked.
    fn fan_out(
        &mut self,
        topic: &str,
        payload: &P,
        priority: Priority,
        cycle: CycleId,
        reserve: u32,
    ) -> usize {
        let order = self.registry.dispatch_order(topic);
        let mut invoked = 0;
        for id in order {
            // A handler unsubscribed since the cache was built simply
            // no longer resolves.
            let Some(entry) = self.registry.entry_mut(topic, id) else {
                continue;
            };
            if reserve < entry.min_reserve {
                continue;
            }
            let delivery = Delivery {
                topic,
                payload,
                priority,
                cycle,
                reserve,
            };
            if let Err(err) = entry.handler.on_event(&delivery) {
                let name = entry.handler.name().to_owned();
                self.stats.record_handler_failure();
                if self.config.logging_enabled {
                    warn!("handler '{name}' failed on '{topic}': {err}");
                }
            }
            invoked += 1;
        }
        invoked
    }

    /// Snapshot the dispatch counters and current backlog size.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.queue.len())
    }

    /// Number of events currently waiting in the backlog.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Total number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.registry.handler_count()
    }

    /// Reset the bus: drop all handlers, pending events, and counters.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.queue.clear();
        self.stats.reset();
    }

    /// The immutable configuration this bus was built with.
    pub fn config(&self) -> &BusConfig {
        &self.config
    }
}

impl<P> std::fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.registry.handler_count())
            .field("queued", &self.queue.len())
            .finish()
    }
}
