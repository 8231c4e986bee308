//! Event dispatch system
//!
//! Scroll, frame and navigation events delivered to registered handlers.
//! Handlers can be removed again through the [`HandlerId`] returned on
//! registration.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    pub const SCROLL: EventType = 30;
    /// Animation frame boundary, emitted once per rendered frame
    pub const FRAME: EventType = 90;
    /// Client-side navigation to a new route
    pub const ROUTE_CHANGE: EventType = 91;
}

new_key_type! {
    /// Handle for removing a registered handler
    pub struct HandlerId;
}

/// An event with associated data
#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    pub target: u64,
    pub data: EventData,
    pub timestamp: u64,
    pub propagation_stopped: bool,
}

/// Event-specific data
#[derive(Clone, Debug)]
pub enum EventData {
    /// Absolute document scroll offset after the scroll step
    Scroll {
        offset_x: f32,
        offset_y: f32,
    },
    Route {
        path: String,
    },
    None,
}

impl Event {
    pub fn new(event_type: EventType, target: u64, data: EventData) -> Self {
        Self {
            event_type,
            target,
            data,
            timestamp: 0,
            propagation_stopped: false,
        }
    }

    pub fn scroll(target: u64, offset_x: f32, offset_y: f32) -> Self {
        Self::new(
            event_types::SCROLL,
            target,
            EventData::Scroll { offset_x, offset_y },
        )
    }

    pub fn frame(target: u64, timestamp: u64) -> Self {
        Self::new(event_types::FRAME, target, EventData::None).at(timestamp)
    }

    pub fn route(target: u64, path: impl Into<String>) -> Self {
        Self::new(
            event_types::ROUTE_CHANGE,
            target,
            EventData::Route { path: path.into() },
        )
    }

    /// Set the event timestamp (milliseconds)
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// Event handler function type
pub type EventHandler = Box<dyn Fn(&Event) + Send + Sync>;

struct HandlerEntry {
    key: (u64, EventType),
    handler: EventHandler,
}

/// Dispatches events to registered handlers in registration order
pub struct EventDispatcher {
    entries: SlotMap<HandlerId, HandlerEntry>,
    handlers: FxHashMap<(u64, EventType), SmallVec<[HandlerId; 2]>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            handlers: FxHashMap::default(),
        }
    }

    /// Register an event handler for a target and event type
    pub fn register<F>(&mut self, target: u64, event_type: EventType, handler: F) -> HandlerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let key = (target, event_type);
        let id = self.entries.insert(HandlerEntry {
            key,
            handler: Box::new(handler),
        });
        self.handlers.entry(key).or_default().push(id);
        id
    }

    /// Remove a handler. Returns false if it was already removed.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        let Some(entry) = self.entries.remove(id) else {
            return false;
        };
        if let Some(ids) = self.handlers.get_mut(&entry.key) {
            ids.retain(|h| *h != id);
            if ids.is_empty() {
                self.handlers.remove(&entry.key);
            }
        }
        tracing::trace!(?id, "event handler removed");
        true
    }

    /// Number of live handlers
    pub fn handler_count(&self) -> usize {
        self.entries.len()
    }

    /// Dispatch an event to all registered handlers
    pub fn dispatch(&self, event: &mut Event) {
        if let Some(ids) = self.handlers.get(&(event.target, event.event_type)) {
            for id in ids {
                if event.propagation_stopped {
                    break;
                }
                if let Some(entry) = self.entries.get(*id) {
                    (entry.handler)(event);
                }
            }
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_dispatch_and_unregister() {
        let mut dispatcher = EventDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let hits_clone = hits.clone();
        let id = dispatcher.register(1, event_types::SCROLL, move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.dispatch(&mut Event::scroll(1, 0.0, 100.0));
        // Different target, not delivered
        dispatcher.dispatch(&mut Event::scroll(2, 0.0, 100.0));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(dispatcher.unregister(id));
        assert!(!dispatcher.unregister(id));
        assert_eq!(dispatcher.handler_count(), 0);

        dispatcher.dispatch(&mut Event::scroll(1, 0.0, 200.0));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_propagation() {
        let mut dispatcher = EventDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));

        dispatcher.register(1, event_types::FRAME, |e| {
            assert_eq!(e.timestamp, 16);
        });
        let hits_clone = hits.clone();
        dispatcher.register(1, event_types::FRAME, move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        let mut event = Event::frame(1, 16);
        dispatcher.dispatch(&mut event);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let mut stopped = Event::frame(1, 16);
        stopped.stop_propagation();
        dispatcher.dispatch(&mut stopped);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
