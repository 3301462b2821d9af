//! Event publish/subscribe channel.
//!
//! Subscribers are plain closures. Events raised while an action runs are
//! buffered; the session flushes them once the action succeeds and drops
//! them if it rolls back, so a subscriber never sees an event for a state
//! that did not survive.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use theme_deck_core::events::{EventBus, GameEvent};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//!
//! let mut bus = EventBus::new();
//! bus.subscribe(move |event: &GameEvent| sink.borrow_mut().push(event.name()));
//!
//! bus.emit(GameEvent::TurnStarted { turn: 1 });
//! assert!(seen.borrow().is_empty());
//!
//! bus.flush();
//! assert_eq!(*seen.borrow(), vec!["turn_started"]);
//! ```

use super::event::GameEvent;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u32);

impl SubscriptionId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

type Handler = Box<dyn FnMut(&GameEvent)>;

/// Buffered event channel with ordered delivery.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Handler)>,
    pending: Vec<GameEvent>,
    next_id: u32,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Handlers run in subscription order.
    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Buffer an event for the next flush.
    pub fn emit(&mut self, event: GameEvent) {
        self.pending.push(event);
    }

    /// Events buffered since the last flush.
    #[must_use]
    pub fn pending(&self) -> &[GameEvent] {
        &self.pending
    }

    /// Deliver buffered events to every subscriber, oldest first.
    pub fn flush(&mut self) {
        for event in std::mem::take(&mut self.pending) {
            for (_, handler) in &mut self.subscribers {
                handler(&event);
            }
        }
    }

    /// Drop buffered events without delivering them.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending)
            .finish()
    }
}
