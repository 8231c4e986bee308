//! Theme state store
//!
//! [`ThemeStateStore`] is the only writer of the overlay's [`ThemeState`].
//! Everything else feeds it (samplers, route changes) or reads it
//! (subscribers, the overlay renderer).
//!
//! Callers that keep the store behind a lock use the `*_deferred` variants
//! and call [`ThemeChange::notify`] after releasing it, so subscribers can
//! read the store again from inside their callback.

use std::sync::Arc;

use navtint_core::Rect;
use navtint_layout::RenderHost;
use slotmap::{new_key_type, SlotMap};

use crate::classifier::{BackgroundClassifier, ClassifyInput, Decision};
use crate::theme::Theme;

new_key_type! {
    /// Handle for removing a theme subscriber
    pub struct SubscriberId;
}

/// Subscriber callback, invoked with the new theme on every change
pub type ThemeSubscriber = Arc<dyn Fn(Theme) + Send + Sync>;

/// The externally visible theme value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeState {
    pub current: Theme,
    pub route: String,
}

/// A committed theme change whose subscribers have not run yet
#[must_use = "subscribers only run when the change is notified"]
pub struct ThemeChange {
    pub theme: Theme,
    subscribers: Vec<ThemeSubscriber>,
}

impl ThemeChange {
    /// Run every subscriber that was registered when the change happened
    pub fn notify(self) {
        for subscriber in &self.subscribers {
            subscriber(self.theme);
        }
    }
}

impl std::fmt::Debug for ThemeChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeChange")
            .field("theme", &self.theme)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Single owner of [`ThemeState`]
pub struct ThemeStateStore {
    state: ThemeState,
    classifier: BackgroundClassifier,
    subscribers: SlotMap<SubscriberId, ThemeSubscriber>,
    last_decision: Option<Decision>,
}

impl ThemeStateStore {
    /// Create the store at mount time. The theme starts `Light` until the
    /// first recompute.
    pub fn new(classifier: BackgroundClassifier, route: impl Into<String>) -> Self {
        Self {
            state: ThemeState {
                current: Theme::Light,
                route: route.into(),
            },
            classifier,
            subscribers: SlotMap::with_key(),
            last_decision: None,
        }
    }

    pub fn state(&self) -> &ThemeState {
        &self.state
    }

    pub fn current(&self) -> Theme {
        self.state.current
    }

    pub fn route(&self) -> &str {
        &self.state.route
    }

    /// Decision behind the most recent recompute
    pub fn last_decision(&self) -> Option<&Decision> {
        self.last_decision.as_ref()
    }

    pub fn classifier(&self) -> &BackgroundClassifier {
        &self.classifier
    }

    /// Register a callback fired whenever the theme changes
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriberId
    where
        F: Fn(Theme) + Send + Sync + 'static,
    {
        self.subscribers.insert(Arc::new(subscriber))
    }

    /// Remove a subscriber. Returns false if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    /// Classify the current position and publish the result if it changed.
    /// Returns true when subscribers were notified.
    pub fn recompute<H: RenderHost>(&mut self, host: &H, overlay: Rect) -> bool {
        self.recompute_deferred(host, overlay)
            .map(ThemeChange::notify)
            .is_some()
    }

    /// Like [`recompute`](Self::recompute), but hands the notification back
    /// to the caller
    pub fn recompute_deferred<H: RenderHost>(
        &mut self,
        host: &H,
        overlay: Rect,
    ) -> Option<ThemeChange> {
        let input = ClassifyInput::new(overlay, &self.state.route, self.state.current);
        let decision = self.classifier.classify(host, &input);
        self.apply(decision)
    }

    /// Switch to a new route and evaluate immediately. Route forces and the
    /// top-of-page default take effect before any scroll; on neutral content
    /// the previous theme is retained like any other inconclusive sample.
    pub fn reset<H: RenderHost>(
        &mut self,
        host: &H,
        route: impl Into<String>,
        overlay: Rect,
    ) -> bool {
        self.reset_deferred(host, route, overlay)
            .map(ThemeChange::notify)
            .is_some()
    }

    /// Like [`reset`](Self::reset), but hands the notification back to the
    /// caller
    pub fn reset_deferred<H: RenderHost>(
        &mut self,
        host: &H,
        route: impl Into<String>,
        overlay: Rect,
    ) -> Option<ThemeChange> {
        self.state.route = route.into();
        tracing::debug!(route = %self.state.route, "theme state reset");
        self.recompute_deferred(host, overlay)
    }

    fn apply(&mut self, decision: Decision) -> Option<ThemeChange> {
        let theme = decision.theme;
        let changed = theme != self.state.current;
        if changed {
            tracing::debug!(
                from = %self.state.current,
                to = %theme,
                source = ?decision.source,
                "overlay theme changed"
            );
            self.state.current = theme;
        }
        self.last_decision = Some(decision);

        changed.then(|| ThemeChange {
            theme,
            subscribers: self.subscribers.values().cloned().collect(),
        })
    }
}

impl std::fmt::Debug for ThemeStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStateStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .field("last_decision", &self.last_decision)
            .finish()
    }
}
