//! Handler storage with a cached, priority-sorted dispatch order.
//!
//! [`HandlerRegistry`] stores subscribed handlers per topic. Each topic
//! keeps its entries in registration order plus a lazily rebuilt
//! dispatch-order cache sorted by descending priority (stable within
//! equal priority, so registration order breaks ties). The cache is
//! invalidated only when that topic's handler set mutates, so repeated
//! emissions never re-sort.

use indexmap::IndexMap;
use smallvec::SmallVec;
use sluice_core::{EventHandler, HandlerId, Priority};
use std::cmp::Reverse;

/// Inline capacity for a topic's dispatch order; topics with more
/// handlers spill to the heap transparently.
pub(crate) type DispatchOrder = SmallVec<[HandlerId; 8]>;

/// Options for a single subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Dispatch priority among this topic's handlers.
    /// Default: [`Priority::NORMAL`].
    pub priority: Priority,
    /// Minimum reserve this handler requires; the dispatcher skips the
    /// handler when the sampled reserve is below it. Default: 0.
    pub min_reserve: u32,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            priority: Priority::NORMAL,
            min_reserve: 0,
        }
    }
}

impl SubscribeOptions {
    /// Options with an explicit priority.
    pub fn with_priority(priority: Priority) -> Self {
        Self {
            priority,
            ..Self::default()
        }
    }

    /// Options with a minimum-reserve requirement.
    pub fn with_min_reserve(min_reserve: u32) -> Self {
        Self {
            min_reserve,
            ..Self::default()
        }
    }
}

/// Opaque handle returned by subscribe; pass back to unsubscribe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    id: HandlerId,
    topic: String,
}

impl Subscription {
    /// The handler's unique identity.
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// The topic this subscription is attached to.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// One registered handler with its dispatch configuration.
pub(crate) struct HandlerEntry<P> {
    pub(crate) id: HandlerId,
    pub(crate) priority: Priority,
    pub(crate) min_reserve: u32,
    pub(crate) handler: Box<dyn EventHandler<P>>,
}

/// A topic's handlers plus the lazily rebuilt dispatch-order cache.
struct TopicHandlers<P> {
    /// Registration order; never re-sorted in place.
    entries: Vec<HandlerEntry<P>>,
    /// Cached dispatch order; `None` after a mutation.
    order: Option<DispatchOrder>,
}

impl<P> TopicHandlers<P> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            order: None,
        }
    }
}

/// Per-topic handler storage for one bus.
pub struct HandlerRegistry<P> {
    topics: IndexMap<String, TopicHandlers<P>>,
    next_id: u64,
}

impl<P> HandlerRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            topics: IndexMap::new(),
            next_id: 0,
        }
    }

    /// Register a handler for `topic`.
    ///
    /// Handlers are immutable once registered; to change priority or
    /// the reserve requirement, unsubscribe and subscribe again.
    pub fn subscribe(
        &mut self,
        topic: impl Into<String>,
        handler: Box<dyn EventHandler<P>>,
        options: SubscribeOptions,
    ) -> Subscription {
        let topic = topic.into();
        let id = HandlerId(self.next_id);
        self.next_id += 1;

        let slot = self
            .topics
            .entry(topic.clone())
            .or_insert_with(TopicHandlers::new);
        slot.entries.push(HandlerEntry {
            id,
            priority: options.priority,
            min_reserve: options.min_reserve,
            handler,
        });
        slot.order = None;

        Subscription { id, topic }
    }

    /// Remove the handler behind `subscription`.
    ///
    /// A handle that was already unsubscribed (or belongs to a cleared
    /// bus) is a no-op.
    pub fn unsubscribe(&mut self, subscription: &Subscription) {
        let Some(slot) = self.topics.get_mut(&subscription.topic) else {
            return;
        };
        let before = slot.entries.len();
        slot.entries.retain(|e| e.id != subscription.id);
        if slot.entries.len() != before {
            slot.order = None;
        }
        if slot.entries.is_empty() {
            self.topics.shift_remove(&subscription.topic);
        }
    }

    /// The dispatch order for `topic`: descending priority, stable
    /// within equal priority.
    ///
    /// Rebuilds the cache if a mutation invalidated it, otherwise
    /// returns the cached order. Callers re-resolve each id via
    /// [`entry_mut`](Self::entry_mut), so an id made stale by a
    /// mid-dispatch unsubscribe is simply skipped.
    pub fn dispatch_order(&mut self, topic: &str) -> DispatchOrder {
        let Some(slot) = self.topics.get_mut(topic) else {
            return DispatchOrder::new();
        };
        if slot.order.is_none() {
            let mut ids: Vec<(Priority, HandlerId)> =
                slot.entries.iter().map(|e| (e.priority, e.id)).collect();
            // Stable sort: equal priorities keep registration order.
            ids.sort_by_key(|(priority, _)| Reverse(*priority));
            slot.order = Some(ids.into_iter().map(|(_, id)| id).collect());
        }
        slot.order.clone().expect("order rebuilt above")
    }

    /// Mutable access to one handler entry, if it still exists.
    pub(crate) fn entry_mut(
        &mut self,
        topic: &str,
        id: HandlerId,
    ) -> Option<&mut HandlerEntry<P>> {
        self.topics
            .get_mut(topic)?
            .entries
            .iter_mut()
            .find(|e| e.id == id)
    }

    /// Total number of registered handlers across all topics.
    pub fn handler_count(&self) -> usize {
        self.topics.values().map(|t| t.entries.len()).sum()
    }

    /// Remove every handler and topic.
    ///
    /// Handler ids are not reused afterwards, so handles from before
    /// the clear stay permanently stale (unsubscribing them is a no-op).
    pub fn clear(&mut self) {
        self.topics.clear();
    }
}

impl<P> Default for HandlerRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for HandlerRegistry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("topics", &self.topics.len())
            .field("handlers", &self.handler_count())
            .finish()
    }
}
