//! Scroll sampling
//!
//! [`ScrollSampler`] decides *when* the overlay theme should be recomputed.
//! Scroll events only mark a sample as pending; the next frame event
//! flushes at most one sample, so a burst of scroll events costs one
//! classification per frame. Mount and route changes sample immediately.
//!
//! ```rust
//! use navtint_core::{Event, EventDispatcher};
//! use navtint_theme::ScrollSampler;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let mut dispatcher = EventDispatcher::new();
//! let samples = Arc::new(AtomicUsize::new(0));
//! let counter = samples.clone();
//!
//! let subscription = ScrollSampler::new(move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! })
//! .attach(&mut dispatcher, 1);
//!
//! for y in [10.0, 20.0, 30.0] {
//!     dispatcher.dispatch(&mut Event::scroll(1, 0.0, y));
//! }
//! dispatcher.dispatch(&mut Event::frame(1, 16));
//! assert_eq!(samples.load(Ordering::SeqCst), 2); // mount + one coalesced scroll
//!
//! subscription.detach(&mut dispatcher);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use navtint_core::events::event_types;
use navtint_core::{Event, EventData, EventDispatcher, HandlerId};
use smallvec::SmallVec;

/// Why a sample was taken
#[derive(Clone, Debug, PartialEq)]
pub enum SampleTrigger {
    /// Sampler attached; initial evaluation
    Mount,
    /// Coalesced scroll burst, with the last reported offset
    Scroll { offset_y: f32 },
    /// Navigation to a new route
    Route(String),
}

/// Sample callback function type
pub type SampleCallback = Box<dyn Fn(&SampleTrigger) + Send + Sync>;

/// Counters for observing coalescing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplerStats {
    pub scroll_events: u64,
    pub samples: u64,
}

struct SamplerShared {
    callback: SampleCallback,
    active: AtomicBool,
    in_flight: AtomicBool,
    pending: Mutex<Option<SampleTrigger>>,
    scroll_events: AtomicU64,
    samples: AtomicU64,
}

/// Throttled scroll/route listener
#[derive(Clone)]
pub struct ScrollSampler {
    shared: Arc<SamplerShared>,
}

impl ScrollSampler {
    /// Create a sampler that invokes `callback` for every sample
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&SampleTrigger) + Send + Sync + 'static,
    {
        Self {
            shared: Arc::new(SamplerShared {
                callback: Box::new(callback),
                active: AtomicBool::new(true),
                in_flight: AtomicBool::new(false),
                pending: Mutex::new(None),
                scroll_events: AtomicU64::new(0),
                samples: AtomicU64::new(0),
            }),
        }
    }

    /// Register scroll, frame and route handlers for `target` and take the
    /// initial mount sample
    pub fn attach(self, dispatcher: &mut EventDispatcher, target: u64) -> ScrollSubscription {
        let mut handlers = SmallVec::new();
        for event_type in [
            event_types::SCROLL,
            event_types::FRAME,
            event_types::ROUTE_CHANGE,
        ] {
            let sampler = self.clone();
            handlers.push(dispatcher.register(target, event_type, move |event| {
                sampler.handle_event(event)
            }));
        }
        tracing::debug!(target, "scroll sampler attached");

        self.mount();
        ScrollSubscription {
            shared: self.shared.clone(),
            handlers,
        }
    }

    /// Subscription handle without dispatcher registrations, for samplers
    /// driven by hand
    pub fn subscription(&self) -> ScrollSubscription {
        ScrollSubscription {
            shared: self.shared.clone(),
            handlers: SmallVec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> SamplerStats {
        SamplerStats {
            scroll_events: self.shared.scroll_events.load(Ordering::SeqCst),
            samples: self.shared.samples.load(Ordering::SeqCst),
        }
    }

    /// Route an event to the matching entry point
    pub fn handle_event(&self, event: &Event) {
        match (event.event_type, &event.data) {
            (event_types::SCROLL, EventData::Scroll { offset_y, .. }) => self.on_scroll(*offset_y),
            (event_types::FRAME, _) => {
                self.on_frame();
            }
            (event_types::ROUTE_CHANGE, EventData::Route { path }) => self.on_route(path),
            _ => {}
        }
    }

    /// Take the initial sample
    pub fn mount(&self) {
        self.fire(SampleTrigger::Mount);
    }

    /// Record a scroll step; sampled on the next frame
    pub fn on_scroll(&self, offset_y: f32) {
        if !self.is_active() {
            return;
        }
        self.shared.scroll_events.fetch_add(1, Ordering::SeqCst);
        self.queue(SampleTrigger::Scroll { offset_y });
    }

    /// Flush a pending sample. Returns true if a sample was taken.
    pub fn on_frame(&self) -> bool {
        let pending = match self.shared.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(_) => None,
        };
        match pending {
            Some(trigger) => self.fire(trigger),
            None => false,
        }
    }

    /// Sample immediately for a new route. Any pending scroll sample is
    /// superseded.
    pub fn on_route(&self, path: &str) {
        if let Ok(mut pending) = self.shared.pending.lock() {
            *pending = None;
        }
        self.fire(SampleTrigger::Route(path.to_string()));
    }

    /// Hold `trigger` for the next frame. A pending mount or route sample
    /// is never replaced by a scroll sample.
    fn queue(&self, trigger: SampleTrigger) {
        let Ok(mut pending) = self.shared.pending.lock() else {
            return;
        };
        let outranked = matches!(trigger, SampleTrigger::Scroll { .. })
            && matches!(
                *pending,
                Some(SampleTrigger::Mount | SampleTrigger::Route(_))
            );
        if !outranked {
            *pending = Some(trigger);
        }
    }

    fn fire(&self, trigger: SampleTrigger) -> bool {
        if !self.is_active() {
            return false;
        }
        // A callback that re-enters the sampler is deferred to the next
        // frame instead of running nested.
        let Some(_in_flight) = InFlight::enter(&self.shared.in_flight) else {
            tracing::trace!(?trigger, "sample deferred, callback in flight");
            self.queue(trigger);
            return false;
        };

        self.shared.samples.fetch_add(1, Ordering::SeqCst);
        (self.shared.callback)(&trigger);
        true
    }
}

/// Clears the in-flight flag on drop, including when the callback panics
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a AtomicBool) -> Option<Self> {
        (!flag.swap(true, Ordering::SeqCst)).then_some(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Cancellation handle for a [`ScrollSampler`]
pub struct ScrollSubscription {
    shared: Arc<SamplerShared>,
    handlers: SmallVec<[HandlerId; 3]>,
}

impl ScrollSubscription {
    /// Stop sampling. Idempotent; returns true only for the call that
    /// actually cancelled.
    pub fn unsubscribe(&self) -> bool {
        let was_active = self.shared.active.swap(false, Ordering::SeqCst);
        if was_active {
            if let Ok(mut pending) = self.shared.pending.lock() {
                *pending = None;
            }
            tracing::debug!("scroll sampler unsubscribed");
        }
        was_active
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Unsubscribe and remove the dispatcher registrations
    pub fn detach(mut self, dispatcher: &mut EventDispatcher) {
        self.unsubscribe();
        for id in self.handlers.drain(..) {
            dispatcher.unregister(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> (ScrollSampler, Arc<Mutex<Vec<SampleTrigger>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let sampler = ScrollSampler::new(move |trigger| {
            log_clone.lock().unwrap().push(trigger.clone());
        });
        (sampler, log)
    }

    #[test]
    fn test_bursts_coalesce_per_frame() {
        let (sampler, log) = recording();

        for y in 1..=50 {
            sampler.on_scroll(y as f32 * 10.0);
        }
        assert!(log.lock().unwrap().is_empty());

        assert!(sampler.on_frame());
        assert!(!sampler.on_frame());

        assert_eq!(
            *log.lock().unwrap(),
            vec![SampleTrigger::Scroll { offset_y: 500.0 }]
        );
        assert_eq!(
            sampler.stats(),
            SamplerStats {
                scroll_events: 50,
                samples: 1
            }
        );
    }

    #[test]
    fn test_attach_samples_on_mount_and_route() {
        let (sampler, log) = recording();
        let mut dispatcher = EventDispatcher::new();
        let _subscription = sampler.attach(&mut dispatcher, 7);

        dispatcher.dispatch(&mut Event::scroll(7, 0.0, 120.0));
        dispatcher.dispatch(&mut Event::route(7, "/pricing"));
        // Route superseded the pending scroll
        dispatcher.dispatch(&mut Event::frame(7, 16));

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                SampleTrigger::Mount,
                SampleTrigger::Route("/pricing".into())
            ]
        );
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let (sampler, log) = recording();
        let mut dispatcher = EventDispatcher::new();
        let subscription = sampler.clone().attach(&mut dispatcher, 1);

        assert!(subscription.unsubscribe());
        assert!(!subscription.unsubscribe());
        assert!(!sampler.is_active());

        dispatcher.dispatch(&mut Event::scroll(1, 0.0, 300.0));
        dispatcher.dispatch(&mut Event::frame(1, 16));
        dispatcher.dispatch(&mut Event::route(1, "/faq"));
        assert_eq!(*log.lock().unwrap(), vec![SampleTrigger::Mount]);

        subscription.detach(&mut dispatcher);
        assert_eq!(dispatcher.handler_count(), 0);
    }

    #[test]
    fn test_pending_dropped_on_unsubscribe() {
        let (sampler, log) = recording();
        let subscription = sampler.subscription();

        sampler.on_scroll(100.0);
        subscription.unsubscribe();
        assert!(!sampler.on_frame());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reentrant_sample_is_deferred() {
        let slot: Arc<Mutex<Option<ScrollSampler>>> = Arc::new(Mutex::new(None));
        let slot_clone = slot.clone();
        let sampler = ScrollSampler::new(move |trigger| {
            if let SampleTrigger::Mount = trigger {
                if let Some(inner) = slot_clone.lock().unwrap().as_ref() {
                    inner.on_scroll(42.0);
                    // Nested flush must not run the callback again
                    assert!(!inner.on_frame());
                }
            }
        });
        *slot.lock().unwrap() = Some(sampler.clone());

        sampler.mount();
        assert!(sampler.on_frame());
        assert_eq!(sampler.stats().samples, 2);
    }

    #[test]
    fn test_reentrant_route_is_deferred_not_dropped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let slot: Arc<Mutex<Option<ScrollSampler>>> = Arc::new(Mutex::new(None));
        let log_clone = log.clone();
        let slot_clone = slot.clone();
        let sampler = ScrollSampler::new(move |trigger| {
            log_clone.lock().unwrap().push(trigger.clone());
            if let SampleTrigger::Mount = trigger {
                if let Some(inner) = slot_clone.lock().unwrap().as_ref() {
                    inner.on_route("/next");
                    // A later scroll must not displace the queued route
                    inner.on_scroll(10.0);
                }
            }
        });
        *slot.lock().unwrap() = Some(sampler.clone());

        sampler.mount();
        assert!(sampler.on_frame());
        assert!(!sampler.on_frame());
        assert_eq!(
            *log.lock().unwrap(),
            vec![SampleTrigger::Mount, SampleTrigger::Route("/next".into())]
        );
    }

    #[test]
    fn test_panicking_callback_does_not_silence_sampler() {
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = calls.clone();
        let sampler = ScrollSampler::new(move |_| {
            let mut calls = calls_clone.lock().unwrap();
            *calls += 1;
            if *calls == 1 {
                drop(calls);
                panic!("renderer failed");
            }
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sampler.mount()));
        assert!(result.is_err());

        sampler.on_scroll(200.0);
        assert!(sampler.on_frame());
        assert_eq!(*calls.lock().unwrap(), 2);
    }
}
