//! Navigation overlay
//!
//! [`NavOverlay`] connects a [`ScrollSampler`] to a [`ThemeStateStore`]:
//! mount and route samples reset the store for the active route, scroll
//! samples recompute it. The host is shared behind an `RwLock` so the page
//! can keep scrolling and mutating between samples.

use std::sync::{Arc, Mutex, RwLock};

use navtint_core::{Color, EventDispatcher, Rect};
use navtint_layout::RenderHost;

use crate::classifier::{BackgroundClassifier, Decision};
use crate::config::OverlayConfig;
use crate::scroll::{SampleTrigger, ScrollSampler, ScrollSubscription};
use crate::state::{SubscriberId, ThemeChange, ThemeState, ThemeStateStore};
use crate::theme::Theme;

/// A mounted overlay
pub struct NavOverlay<H> {
    host: Arc<RwLock<H>>,
    store: Arc<Mutex<ThemeStateStore>>,
    bounds: Rect,
    subscription: ScrollSubscription,
}

impl<H> NavOverlay<H>
where
    H: RenderHost + Send + Sync + 'static,
{
    /// Mount with a store built from `config`
    pub fn mount_with_config(
        host: Arc<RwLock<H>>,
        bounds: Rect,
        route: impl Into<String>,
        config: &OverlayConfig,
        dispatcher: &mut EventDispatcher,
        target: u64,
    ) -> Self {
        let store = ThemeStateStore::new(BackgroundClassifier::new(config), route);
        Self::mount(host, bounds, store, dispatcher, target)
    }

    /// Mount an overlay occupying `bounds` (viewport coordinates).
    ///
    /// Subscribers already registered on `store` observe the mount-time
    /// evaluation.
    pub fn mount(
        host: Arc<RwLock<H>>,
        bounds: Rect,
        store: ThemeStateStore,
        dispatcher: &mut EventDispatcher,
        target: u64,
    ) -> Self {
        let store = Arc::new(Mutex::new(store));

        let sampler = {
            let host = host.clone();
            let store = store.clone();
            ScrollSampler::new(move |trigger| sample(&host, &store, bounds, trigger))
        };
        let subscription = sampler.attach(dispatcher, target);

        Self {
            host,
            store,
            bounds,
            subscription,
        }
    }

    pub fn host(&self) -> &Arc<RwLock<H>> {
        &self.host
    }

    pub fn store(&self) -> &Arc<Mutex<ThemeStateStore>> {
        &self.store
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn theme(&self) -> Theme {
        self.store
            .lock()
            .map(|store| store.current())
            .unwrap_or_default()
    }

    /// Foreground color for the overlay's links and logo
    pub fn foreground(&self) -> Color {
        self.theme().foreground()
    }

    pub fn state(&self) -> Option<ThemeState> {
        self.store.lock().ok().map(|store| store.state().clone())
    }

    pub fn last_decision(&self) -> Option<Decision> {
        self.store
            .lock()
            .ok()
            .and_then(|store| store.last_decision().cloned())
    }

    /// Register a theme change callback
    pub fn subscribe<F>(&self, subscriber: F) -> Option<SubscriberId>
    where
        F: Fn(Theme) + Send + Sync + 'static,
    {
        self.store
            .lock()
            .ok()
            .map(|mut store| store.subscribe(subscriber))
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stop sampling. The last theme stays readable.
    pub fn unmount(&self) -> bool {
        self.subscription.unsubscribe()
    }

    /// Unmount and drop the dispatcher registrations
    pub fn detach(self, dispatcher: &mut EventDispatcher) {
        self.subscription.detach(dispatcher);
    }
}

fn sample<H: RenderHost>(
    host: &RwLock<H>,
    store: &Mutex<ThemeStateStore>,
    bounds: Rect,
    trigger: &SampleTrigger,
) {
    // Both guards are released before subscribers run
    if let Some(change) = evaluate(host, store, bounds, trigger) {
        change.notify();
    }
}

fn evaluate<H: RenderHost>(
    host: &RwLock<H>,
    store: &Mutex<ThemeStateStore>,
    bounds: Rect,
    trigger: &SampleTrigger,
) -> Option<ThemeChange> {
    let Ok(host) = host.read() else {
        tracing::warn!(?trigger, "render host lock poisoned, sample skipped");
        return None;
    };
    let Ok(mut store) = store.lock() else {
        tracing::warn!(?trigger, "theme store lock poisoned, sample skipped");
        return None;
    };

    tracing::trace!(?trigger, "overlay sample");
    match trigger {
        SampleTrigger::Mount => {
            let route = store.route().to_string();
            store.reset_deferred(&*host, route, bounds)
        }
        SampleTrigger::Route(path) => store.reset_deferred(&*host, path.clone(), bounds),
        SampleTrigger::Scroll { .. } => store.recompute_deferred(&*host, bounds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navtint_core::{Event, Size};
    use navtint_layout::{RenderNode, RenderTree};

    const TARGET: u64 = 1;

    fn page() -> RenderTree {
        let mut tree = RenderTree::new(Size::new(1280.0, 800.0));
        let root = tree.root();
        for (i, bg) in ["#ffffff", "#0a0a0a", "#ffffff"].iter().enumerate() {
            tree.insert_child(
                root,
                RenderNode::new()
                    .with_background(*bg)
                    .with_bounds(Rect::new(0.0, i as f32 * 1000.0, 1280.0, 1000.0)),
            );
        }
        tree
    }

    fn mounted(route: &str) -> (NavOverlay<RenderTree>, EventDispatcher) {
        let mut dispatcher = EventDispatcher::new();
        let overlay = NavOverlay::mount_with_config(
            Arc::new(RwLock::new(page())),
            Rect::new(0.0, 0.0, 1280.0, 64.0),
            route,
            &OverlayConfig::default(),
            &mut dispatcher,
            TARGET,
        );
        (overlay, dispatcher)
    }

    fn scroll(overlay: &NavOverlay<RenderTree>, dispatcher: &EventDispatcher, y: f32) {
        overlay.host().write().unwrap().scroll_to(0.0, y);
        dispatcher.dispatch(&mut Event::scroll(TARGET, 0.0, y));
        dispatcher.dispatch(&mut Event::frame(TARGET, 0));
    }

    #[test]
    fn test_mount_evaluates_immediately() {
        let (overlay, _dispatcher) = mounted("/launch");
        assert_eq!(overlay.theme(), Theme::Dark);
        assert_eq!(overlay.foreground(), Color::WHITE);
    }

    #[test]
    fn test_scroll_drives_theme() {
        let (overlay, dispatcher) = mounted("/");
        assert_eq!(overlay.theme(), Theme::Light);

        scroll(&overlay, &dispatcher, 1200.0);
        assert_eq!(overlay.theme(), Theme::Dark);

        scroll(&overlay, &dispatcher, 2100.0);
        assert_eq!(overlay.theme(), Theme::Light);
    }

    #[test]
    fn test_scroll_waits_for_frame() {
        let (overlay, dispatcher) = mounted("/");
        overlay.host().write().unwrap().scroll_to(0.0, 1200.0);
        dispatcher.dispatch(&mut Event::scroll(TARGET, 0.0, 1200.0));
        assert_eq!(overlay.theme(), Theme::Light);

        dispatcher.dispatch(&mut Event::frame(TARGET, 16));
        assert_eq!(overlay.theme(), Theme::Dark);
    }

    #[test]
    fn test_route_change_resets() {
        let (overlay, dispatcher) = mounted("/");
        dispatcher.dispatch(&mut Event::route(TARGET, "/launch"));
        assert_eq!(overlay.theme(), Theme::Dark);
        assert_eq!(overlay.state().unwrap().route, "/launch");

        dispatcher.dispatch(&mut Event::route(TARGET, "/pricing"));
        assert_eq!(overlay.theme(), Theme::Light);
    }

    #[test]
    fn test_subscriber_can_read_overlay() {
        let (overlay, dispatcher) = mounted("/");
        let overlay = Arc::new(overlay);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let reader = Arc::downgrade(&overlay);
        let seen_clone = seen.clone();
        overlay.subscribe(move |theme| {
            let Some(overlay) = reader.upgrade() else {
                return;
            };
            let host_writable = overlay.host().try_write().is_ok();
            seen_clone
                .lock()
                .unwrap()
                .push((theme, overlay.theme(), overlay.foreground(), host_writable));
        });

        scroll(&overlay, &dispatcher, 1200.0);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(Theme::Dark, Theme::Dark, Color::WHITE, true)]
        );
    }

    #[test]
    fn test_unmount_retains_theme() {
        let (overlay, mut dispatcher) = mounted("/");
        scroll(&overlay, &dispatcher, 1200.0);

        assert!(overlay.is_mounted());
        assert!(overlay.unmount());
        assert!(!overlay.unmount());
        assert!(!overlay.is_mounted());
        scroll(&overlay, &dispatcher, 2100.0);
        assert_eq!(overlay.theme(), Theme::Dark);

        overlay.detach(&mut dispatcher);
        assert_eq!(dispatcher.handler_count(), 0);
    }
}
