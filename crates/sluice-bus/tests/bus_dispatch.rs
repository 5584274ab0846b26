//! End-to-end dispatch behavior across the registry, policy, queue,
//! and stats working together.
//!
//! Each test drives a full bus through `emit`/`process_queue` with a
//! scripted host, covering the ordering, gating, batching, expiry, and
//! shedding contracts as observable behavior.

use std::cell::Cell;
use std::rc::Rc;

use sluice_bus::{BusConfig, EventBus, SubscribeOptions};
use sluice_core::{DropReason, EmitOptions, EmitOutcome, Priority};
use sluice_test_utils::{CountingHandler, RecordingHandler, ScriptedHost};

const HIGH_RESERVE: u32 = 5000;
const MID_RESERVE: u32 = 1500;
const CRITICAL_RESERVE: u32 = 500;

fn make_bus(reserve: u32, config: BusConfig) -> (EventBus<u32>, Rc<ScriptedHost>) {
    let host = Rc::new(ScriptedHost::new(reserve));
    let bus = EventBus::new(config, Box::new(Rc::clone(&host))).unwrap();
    (bus, host)
}

// ── handler ordering ─────────────────────────────────────────────

#[test]
fn handlers_fire_in_descending_priority_order() {
    let (mut bus, _host) = make_bus(HIGH_RESERVE, BusConfig::default());
    let log = RecordingHandler::shared_log();
    for (name, priority) in [("mid", 50), ("low", 10), ("top", 75), ("base", 25)] {
        bus.subscribe(
            "sensor.update",
            Box::new(RecordingHandler::new(name, Rc::clone(&log))),
            SubscribeOptions::with_priority(Priority(priority)),
        );
    }

    bus.emit("sensor.update", 0, EmitOptions::default());
    assert_eq!(*log.borrow(), vec!["top", "mid", "base", "low"]);
}

#[test]
fn equal_priority_handlers_fire_in_registration_order() {
    let (mut bus, _host) = make_bus(HIGH_RESERVE, BusConfig::default());
    let log = RecordingHandler::shared_log();
    for name in ["first", "second", "third"] {
        bus.subscribe(
            "sensor.update",
            Box::new(RecordingHandler::new(name, Rc::clone(&log))),
            SubscribeOptions::default(),
        );
    }

    bus.emit("sensor.update", 0, EmitOptions::default());
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

// ── backlog ordering ─────────────────────────────────────────────

#[test]
fn identical_priority_events_drain_in_emission_order() {
    let (mut bus, host) = make_bus(MID_RESERVE, BusConfig::default());
    let log = RecordingHandler::shared_log();
    for topic in ["a", "b", "c", "d"] {
        bus.subscribe(
            topic,
            Box::new(RecordingHandler::new(topic, Rc::clone(&log))),
            SubscribeOptions::default(),
        );
    }

    for topic in ["c", "a", "d", "b"] {
        bus.emit(topic, 0, EmitOptions::default());
    }
    host.set_reserve(HIGH_RESERVE);
    assert_eq!(bus.process_queue(), 4);
    assert_eq!(*log.borrow(), vec!["c", "a", "d", "b"]);
}

#[test]
fn mixed_priorities_drain_highest_first() {
    let (mut bus, host) = make_bus(MID_RESERVE, BusConfig::default());
    let log = RecordingHandler::shared_log();
    for topic in ["p10", "p25", "p50", "p75"] {
        bus.subscribe(
            topic,
            Box::new(RecordingHandler::new(topic, Rc::clone(&log))),
            SubscribeOptions::default(),
        );
    }

    // Emission order deliberately scrambled.
    bus.emit("p25", 0, EmitOptions::with_priority(Priority(25)));
    bus.emit("p75", 0, EmitOptions::with_priority(Priority(75)));
    bus.emit("p10", 0, EmitOptions::with_priority(Priority(10)));
    bus.emit("p50", 0, EmitOptions::with_priority(Priority(50)));

    host.set_reserve(HIGH_RESERVE);
    assert_eq!(bus.process_queue(), 4);
    assert_eq!(*log.borrow(), vec!["p75", "p50", "p25", "p10"]);
}

// ── immediate flag ───────────────────────────────────────────────

#[test]
fn immediate_emission_delivers_at_zero_reserve() {
    let (mut bus, _host) = make_bus(0, BusConfig::default());
    let count = Rc::new(Cell::new(0));
    bus.subscribe(
        "alarm",
        Box::new(CountingHandler::new("alarm", Rc::clone(&count))),
        SubscribeOptions::default(),
    );

    let outcome = bus.emit("alarm", 0, EmitOptions::immediate());
    assert_eq!(outcome, EmitOutcome::Delivered { handlers_run: 1 });
    assert_eq!(count.get(), 1);
}

#[test]
fn immediate_emission_still_honors_handler_reserve_floors() {
    // The immediate flag bypasses the emission-time priority gate, not
    // the per-handler reserve gate.
    let (mut bus, _host) = make_bus(0, BusConfig::default());
    let gated = Rc::new(Cell::new(0));
    let open = Rc::new(Cell::new(0));
    bus.subscribe(
        "alarm",
        Box::new(CountingHandler::new("gated", Rc::clone(&gated))),
        SubscribeOptions::with_min_reserve(100),
    );
    bus.subscribe(
        "alarm",
        Box::new(CountingHandler::new("open", Rc::clone(&open))),
        SubscribeOptions::default(),
    );

    let outcome = bus.emit("alarm", 0, EmitOptions::immediate());
    assert_eq!(outcome, EmitOutcome::Delivered { handlers_run: 1 });
    assert_eq!(gated.get(), 0);
    assert_eq!(open.get(), 1);
}

// ── reserve gating among siblings ────────────────────────────────

#[test]
fn reserve_floor_skips_one_sibling_not_the_event() {
    let (mut bus, _host) = make_bus(HIGH_RESERVE, BusConfig::default());
    let hungry = Rc::new(Cell::new(0));
    let frugal = Rc::new(Cell::new(0));
    bus.subscribe(
        "plan",
        Box::new(CountingHandler::new("hungry", Rc::clone(&hungry))),
        SubscribeOptions {
            priority: Priority::HIGH,
            min_reserve: HIGH_RESERVE + 1,
        },
    );
    bus.subscribe(
        "plan",
        Box::new(CountingHandler::new("frugal", Rc::clone(&frugal))),
        SubscribeOptions::default(),
    );

    bus.emit("plan", 0, EmitOptions::default());
    assert_eq!(hungry.get(), 0);
    assert_eq!(frugal.get(), 1);
    assert_eq!(bus.stats().events_processed, 1);
}

// ── batch sizing across the reserve ladder ───────────────────────

#[test]
fn deferred_mode_halves_the_drain_batch() {
    let config = BusConfig {
        max_events_per_batch: 50,
        critical_threshold: 1000,
        low_threshold: 2000,
        ..BusConfig::default()
    };
    let (mut bus, host) = make_bus(MID_RESERVE, config);
    let count = Rc::new(Cell::new(0));
    bus.subscribe(
        "work",
        Box::new(CountingHandler::new("work", Rc::clone(&count))),
        SubscribeOptions::default(),
    );

    for i in 0..60 {
        let outcome = bus.emit("work", i, EmitOptions::default());
        assert!(matches!(outcome, EmitOutcome::Enqueued { .. }));
    }
    assert_eq!(bus.queue_len(), 60);

    // Reserve 1500 sits between the thresholds: half batch (25).
    assert_eq!(bus.process_queue(), 25);
    assert_eq!(count.get(), 25);
    assert_eq!(bus.queue_len(), 35);

    // Recovered reserve: full batch, which covers the remainder.
    host.set_reserve(5000);
    assert_eq!(bus.process_queue(), 35);
    assert_eq!(bus.queue_len(), 0);
    assert_eq!(count.get(), 60);
}

// ── age expiry ───────────────────────────────────────────────────

#[test]
fn stale_events_drop_instead_of_delivering() {
    let config = BusConfig {
        max_event_age: 5,
        ..BusConfig::default()
    };
    let (mut bus, host) = make_bus(MID_RESERVE, config);
    let count = Rc::new(Cell::new(0));
    bus.subscribe(
        "late",
        Box::new(CountingHandler::new("late", Rc::clone(&count))),
        SubscribeOptions::default(),
    );

    bus.emit("late", 0, EmitOptions::with_priority(Priority(1000)));
    host.advance(6);
    host.set_reserve(HIGH_RESERVE);

    assert_eq!(bus.process_queue(), 0);
    assert_eq!(count.get(), 0);
    let stats = bus.stats();
    assert_eq!(stats.expired_drops, 1);
    assert_eq!(stats.events_dropped, 1);
    assert_eq!(stats.queue_size, 0);
}

#[test]
fn events_at_exactly_max_age_still_deliver() {
    let config = BusConfig {
        max_event_age: 5,
        ..BusConfig::default()
    };
    let (mut bus, host) = make_bus(MID_RESERVE, config);
    let count = Rc::new(Cell::new(0));
    bus.subscribe(
        "late",
        Box::new(CountingHandler::new("late", Rc::clone(&count))),
        SubscribeOptions::default(),
    );

    bus.emit("late", 0, EmitOptions::default());
    host.advance(5);
    host.set_reserve(HIGH_RESERVE);
    assert_eq!(bus.process_queue(), 1);
    assert_eq!(count.get(), 1);
}

// ── critical-reserve behavior ────────────────────────────────────

#[test]
fn critical_reserve_sheds_defers_and_suspends() {
    let (mut bus, host) = make_bus(CRITICAL_RESERVE, BusConfig::default());
    let count = Rc::new(Cell::new(0));
    bus.subscribe(
        "mixed",
        Box::new(CountingHandler::new("mixed", Rc::clone(&count))),
        SubscribeOptions::default(),
    );

    // Sub-floor: shed outright.
    let shed = bus.emit("mixed", 0, EmitOptions::default());
    assert_eq!(
        shed,
        EmitOutcome::Dropped {
            reason: DropReason::CriticalShed
        }
    );

    // At the floor: preserved in the backlog for recovery.
    let kept = bus.emit("mixed", 0, EmitOptions::with_priority(Priority::CRITICAL));
    assert!(matches!(kept, EmitOutcome::Enqueued { .. }));

    // Immediate: dispatched on the spot.
    let urgent = bus.emit("mixed", 0, EmitOptions::immediate());
    assert_eq!(urgent, EmitOutcome::Delivered { handlers_run: 1 });
    assert_eq!(count.get(), 1);

    // No draining while critical.
    assert_eq!(bus.process_queue(), 0);
    assert_eq!(bus.queue_len(), 1);

    // After recovery, the preserved event delivers.
    host.set_reserve(HIGH_RESERVE);
    assert_eq!(bus.process_queue(), 1);
    assert_eq!(count.get(), 2);
}

// ── overflow ─────────────────────────────────────────────────────

#[test]
fn overflow_rejects_newcomers_that_do_not_outrank_the_backlog() {
    let config = BusConfig {
        max_queue_size: 3,
        ..BusConfig::default()
    };
    let (mut bus, _host) = make_bus(MID_RESERVE, config);

    for i in 0..3 {
        bus.emit("work", i, EmitOptions::default());
    }
    let outcome = bus.emit("work", 3, EmitOptions::default());
    assert_eq!(
        outcome,
        EmitOutcome::Dropped {
            reason: DropReason::QueueFull
        }
    );
    assert_eq!(bus.queue_len(), 3);
    assert_eq!(bus.stats().overflow_drops, 1);
}

#[test]
fn overflow_evicts_the_weakest_entry_for_a_stronger_newcomer() {
    let config = BusConfig {
        max_queue_size: 3,
        ..BusConfig::default()
    };
    let (mut bus, host) = make_bus(MID_RESERVE, config);
    let log = RecordingHandler::shared_log();
    for topic in ["weak", "strong"] {
        bus.subscribe(
            topic,
            Box::new(RecordingHandler::new(topic, Rc::clone(&log))),
            SubscribeOptions::default(),
        );
    }

    bus.emit("weak", 0, EmitOptions::with_priority(Priority::LOW));
    bus.emit("strong", 0, EmitOptions::with_priority(Priority::HIGH));
    bus.emit("strong", 0, EmitOptions::with_priority(Priority::HIGH));
    let outcome = bus.emit("strong", 0, EmitOptions::with_priority(Priority::CRITICAL));
    assert!(matches!(outcome, EmitOutcome::Enqueued { .. }));

    // Still bounded; the low-priority entry paid for the newcomer.
    assert_eq!(bus.queue_len(), 3);
    let stats = bus.stats();
    assert_eq!(stats.overflow_drops, 1);
    assert_eq!(stats.events_deferred, 4);

    host.set_reserve(HIGH_RESERVE);
    assert_eq!(bus.process_queue(), 3);
    assert_eq!(*log.borrow(), vec!["strong", "strong", "strong"]);
}

// ── lifecycle ────────────────────────────────────────────────────

#[test]
fn clear_zeroes_stats_and_queue() {
    let (mut bus, _host) = make_bus(MID_RESERVE, BusConfig::default());
    let count = Rc::new(Cell::new(0));
    bus.subscribe(
        "work",
        Box::new(CountingHandler::new("work", Rc::clone(&count))),
        SubscribeOptions::default(),
    );
    bus.emit("work", 0, EmitOptions::default());
    bus.emit("work", 0, EmitOptions::immediate());

    bus.clear();
    let stats = bus.stats();
    assert_eq!(stats.queue_size, 0);
    assert_eq!(stats.events_processed, 0);
    assert_eq!(stats.events_deferred, 0);
    assert_eq!(stats.events_dropped, 0);
    assert_eq!(bus.handler_count(), 0);
}

#[test]
fn counters_accumulate_across_a_realistic_cycle_run() {
    let config = BusConfig {
        max_queue_size: 8,
        max_event_age: 10,
        ..BusConfig::default()
    };
    let (mut bus, host) = make_bus(HIGH_RESERVE, config);
    let count = Rc::new(Cell::new(0));
    bus.subscribe(
        "tick",
        Box::new(CountingHandler::new("tick", Rc::clone(&count))),
        SubscribeOptions::default(),
    );

    // Cycle 1: flush reserve, everything dispatches inline.
    bus.emit("tick", 0, EmitOptions::default());
    bus.emit("tick", 0, EmitOptions::default());
    bus.process_queue();

    // Cycle 2: reserve sags, emissions defer.
    host.advance(1);
    host.set_reserve(MID_RESERVE);
    bus.emit("tick", 0, EmitOptions::default());
    bus.emit("tick", 0, EmitOptions::default());
    bus.process_queue();

    // Cycle 3: reserve collapses, emissions shed, backlog freezes.
    host.advance(1);
    host.set_reserve(CRITICAL_RESERVE);
    bus.emit("tick", 0, EmitOptions::default());
    bus.process_queue();

    let stats = bus.stats();
    assert_eq!(stats.events_processed, 4);
    assert_eq!(stats.events_deferred, 2);
    assert_eq!(stats.shed_drops, 1);
    assert_eq!(stats.events_dropped, 1);
    assert_eq!(stats.queue_size, 0);
    assert_eq!(count.get(), 4);
}
