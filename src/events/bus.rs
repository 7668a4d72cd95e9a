//! Typed publish/subscribe channel
//!
//! Delivery is synchronous and fire-and-forget: handlers run in
//! subscription order on the publishing thread and return nothing.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use super::{EventKind, GameEvent};

pub type EventHandler = Box<dyn FnMut(&GameEvent)>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct EventBus {
    handlers: AHashMap<EventKind, Vec<(SubscriptionId, EventHandler)>>,
    wildcard: Vec<(SubscriptionId, EventHandler)>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("kinds", &self.handlers.len())
            .field("wildcard", &self.wildcard.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a handler for one kind of event
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let id = self.allocate_id();
        self.handlers.entry(kind).or_default().push((id, Box::new(handler)));
        id
    }

    /// Register a handler that receives every event
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let id = self.allocate_id();
        self.wildcard.push((id, Box::new(handler)));
        id
    }

    /// Remove a subscription. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscription_count();
        for list in self.handlers.values_mut() {
            list.retain(|(sid, _)| *sid != id);
        }
        self.wildcard.retain(|(sid, _)| *sid != id);
        self.subscription_count() < before
    }

    pub fn subscription_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum::<usize>() + self.wildcard.len()
    }

    /// Deliver an event to the handlers of its kind, then to wildcard handlers
    pub fn publish(&mut self, event: &GameEvent) {
        if let Some(list) = self.handlers.get_mut(&event.kind()) {
            for (_, handler) in list.iter_mut() {
                handler(event);
            }
        }
        for (_, handler) in self.wildcard.iter_mut() {
            handler(event);
        }
    }
}

/// Collects every published event; mostly useful in tests and tooling
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl EventRecorder {
    /// Create a recorder subscribed to all events on `bus`
    pub fn attach(bus: &mut EventBus) -> Self {
        let recorder = Self::default();
        let sink = Rc::clone(&recorder.events);
        bus.subscribe_all(move |event| sink.borrow_mut().push(event.clone()));
        recorder
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.borrow().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<GameEvent> {
        self.events.borrow().iter().filter(|e| e.kind() == kind).cloned().collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
