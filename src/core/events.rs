//! Editor Event Broadcasting
//!
//! In-process, topic-typed notification bus keeping the tabular editor and
//! the visual timeline in sync. Delivery is synchronous and FIFO per
//! subscriber; events are not persisted. A failing subscriber never unwinds
//! into the publisher — handler errors are logged and swallowed so command
//! execution cannot be aborted by a misbehaving view.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;
use tracing::warn;

use super::subtitles::SubtitleEntry;
use super::{EntryId, TimeSec};

// =============================================================================
// Topics
// =============================================================================

/// Topic names, used for logging and subscriber filtering
pub mod topics {
    /// An entry joined the document
    pub const ENTRY_ADDED: &str = "entry:added";
    /// An entry left the document
    pub const ENTRY_REMOVED: &str = "entry:removed";
    /// A visible field of an entry changed
    pub const ENTRY_UPDATED: &str = "entry:updated";
    /// The selection changed, with a seek position for the player
    pub const ENTRY_SELECTED: &str = "entry:selected";
}

// =============================================================================
// Event Types
// =============================================================================

/// Notifications produced by the editing core
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// An entry was inserted into the document
    EntryAdded { entry: SubtitleEntry },
    /// An entry was removed from the document
    EntryRemoved { entry: SubtitleEntry },
    /// A visible field (time, speaker, text) of an entry changed
    EntryUpdated { entry: SubtitleEntry },
    /// The selection changed; `seek_sec` is derived from the entry's start
    /// time so the player can jump there
    EntrySelected { entry_id: EntryId, seek_sec: TimeSec },
}

impl EditorEvent {
    /// Topic this event belongs to
    pub fn topic(&self) -> &'static str {
        match self {
            EditorEvent::EntryAdded { .. } => topics::ENTRY_ADDED,
            EditorEvent::EntryRemoved { .. } => topics::ENTRY_REMOVED,
            EditorEvent::EntryUpdated { .. } => topics::ENTRY_UPDATED,
            EditorEvent::EntrySelected { .. } => topics::ENTRY_SELECTED,
        }
    }
}

// =============================================================================
// Event Bus
// =============================================================================

/// Result type for subscriber callbacks
pub type HandlerResult = Result<(), String>;

type Handler = Rc<dyn Fn(&EditorEvent) -> HandlerResult>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription(u64);

/// Synchronous in-process event bus.
///
/// Single-threaded by design — the editing session and all views live on
/// one logical thread, so subscribers are plain (non-`Send`) closures.
pub struct EventBus {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(u64, Handler)>>,
}

impl EventBus {
    /// Creates an empty bus
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Registers a subscriber for all topics.
    ///
    /// Handlers receive events in publication order. Returning an `Err`
    /// marks the delivery as failed for logging purposes only; it does not
    /// affect other subscribers or the publisher.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&EditorEvent) -> HandlerResult + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(handler)));
        Subscription(id)
    }

    /// Removes a previously registered subscriber
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.subscribers
            .borrow_mut()
            .retain(|(id, _)| *id != subscription.0);
    }

    /// Delivers an event to every subscriber, in subscription order.
    ///
    /// Handler failures are logged at warn level and swallowed; a
    /// notification failure must never abort the mutation that raised it.
    pub fn publish(&self, event: &EditorEvent) {
        // Snapshot the handler list so subscribers may (un)subscribe while
        // a delivery is in flight.
        let handlers: Vec<Handler> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();

        for handler in handlers {
            if let Err(message) = handler(event) {
                warn!(topic = event.topic(), %message, "event handler failed");
            }
        }
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn selected_event() -> EditorEvent {
        EditorEvent::EntrySelected {
            entry_id: "01TEST".to_string(),
            seek_sec: 4.0,
        }
    }

    #[test]
    fn test_publish_reaches_subscribers_in_order() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |_event| {
                seen.borrow_mut().push(tag);
                Ok(())
            });
        }

        bus.publish(&selected_event());
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_handler_failure_does_not_stop_delivery() {
        let bus = EventBus::new();
        let delivered = Rc::new(Cell::new(false));

        bus.subscribe(|_event| Err("broken view".to_string()));
        let flag = Rc::clone(&delivered);
        bus.subscribe(move |_event| {
            flag.set(true);
            Ok(())
        });

        bus.publish(&selected_event());
        assert!(delivered.get());
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&count);
        let sub = bus.subscribe(move |_event| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        bus.publish(&selected_event());
        bus.unsubscribe(sub);
        bus.publish(&selected_event());

        assert_eq!(count.get(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribe_during_delivery_is_safe() {
        let bus = Rc::new(EventBus::new());
        let inner = Rc::clone(&bus);
        bus.subscribe(move |_event| {
            inner.subscribe(|_event| Ok(()));
            Ok(())
        });

        bus.publish(&selected_event());
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_event_topics() {
        assert_eq!(selected_event().topic(), topics::ENTRY_SELECTED);
    }
}
