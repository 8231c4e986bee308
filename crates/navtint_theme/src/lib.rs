//! navtint Theme Engine
//!
//! Decides whether a fixed navigation overlay should draw dark or light
//! foreground based on what is scrolled underneath it.
//!
//! # Overview
//!
//! - [`ScrollSampler`]: coalesces scroll events to one sample per frame and
//!   samples immediately on mount and navigation
//! - [`SectionRegistry`]: ordered route and named-section overrides
//! - [`BackgroundClassifier`]: the rule table that turns overrides and raw
//!   background samples into a [`Theme`]
//! - [`ThemeStateStore`]: the single owner of the current theme
//! - [`NavOverlay`]: wires all of the above to an [`EventDispatcher`]
//!
//! # Quick Start
//!
//! ```rust
//! use navtint_core::{Rect, Size};
//! use navtint_layout::{RenderNode, RenderTree};
//! use navtint_theme::{BackgroundClassifier, OverlayConfig, Theme, ThemeStateStore};
//!
//! let mut tree = RenderTree::new(Size::new(1280.0, 800.0));
//! let root = tree.root();
//! tree.insert_child(
//!     root,
//!     RenderNode::new()
//!         .with_background("rgb(10, 10, 10)")
//!         .with_bounds(Rect::new(0.0, 0.0, 1280.0, 3000.0)),
//! );
//! tree.scroll_to(0.0, 900.0);
//!
//! let classifier = BackgroundClassifier::new(&OverlayConfig::default());
//! let mut store = ThemeStateStore::new(classifier, "/");
//! store.recompute(&tree, Rect::new(0.0, 0.0, 1280.0, 64.0));
//! assert_eq!(store.current(), Theme::Dark);
//! ```
//!
//! [`EventDispatcher`]: navtint_core::EventDispatcher

pub mod classifier;
pub mod config;
pub mod overlay;
pub mod registry;
pub mod scroll;
pub mod state;
pub mod theme;

pub use classifier::{
    classify_sample, BackgroundClassifier, ClassifyInput, Decision, DecisionSource, Rule,
    RULE_ORDER,
};
pub use config::{ConfigError, HintConfig, OverlayConfig, RegionConfig, SmallElement, Thresholds};
pub use overlay::NavOverlay;
pub use registry::{RegionRule, SectionRegistry};
pub use scroll::{SampleTrigger, SamplerStats, ScrollSampler, ScrollSubscription};
pub use state::{SubscriberId, ThemeChange, ThemeState, ThemeStateStore};
pub use theme::{ForcedTheme, Theme};
