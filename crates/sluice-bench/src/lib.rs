//! Shared workload builders for Sluice benchmarks.
//!
//! The reference topology below approximates a mid-size host: a
//! handful of topics, a spread of handler priorities, and a few
//! reserve-gated consumers. Benchmarks and stress tests build on it so
//! numbers stay comparable across runs.

#![forbid(unsafe_code)]

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use sluice_bus::{BusConfig, EventBus, SubscribeOptions};
use sluice_core::{handler_fn, Delivery, HostSignals, Priority};

/// Topics used by the reference topology, roughly ordered by urgency.
pub const REFERENCE_TOPICS: [&str; 8] = [
    "defense.breach",
    "defense.sighted",
    "logistics.request",
    "logistics.delivered",
    "economy.price",
    "economy.trade",
    "telemetry.sample",
    "telemetry.flush",
];

/// Build the reference bus: 8 topics, 4 handlers each.
///
/// Per topic, the handlers cover the priority ladder and one of them
/// carries a reserve floor, so immediate dispatch, drain fan-out, and
/// reserve gating all show up in every measurement.
pub fn reference_bus(host: Box<dyn HostSignals>) -> EventBus<u64> {
    let mut bus = EventBus::new(BusConfig::default(), host).expect("default config is valid");
    for topic in REFERENCE_TOPICS {
        for (i, priority) in [
            Priority::CRITICAL,
            Priority::HIGH,
            Priority::NORMAL,
            Priority::LOW,
        ]
        .into_iter()
        .enumerate()
        {
            let name = format!("{topic}#{i}");
            let handler = handler_fn(name, |d: &Delivery<'_, u64>| {
                std::hint::black_box(*d.payload);
                Ok(())
            });
            let options = SubscribeOptions {
                priority,
                // One gated consumer per topic.
                min_reserve: if i == 3 { 3000 } else { 0 },
            };
            bus.subscribe(topic, Box::new(handler), options);
        }
    }
    bus
}

/// A deterministic spread of emission priorities.
///
/// Seeded so repeated benchmark runs replay the same mix: mostly
/// normal-priority traffic with occasional critical spikes.
pub fn priority_spread(seed: u64, len: usize) -> Vec<Priority> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| match rng.random_range(0..10u32) {
            0 => Priority::CRITICAL,
            1 | 2 => Priority::HIGH,
            3..=8 => Priority::NORMAL,
            _ => Priority::LOW,
        })
        .collect()
}
