//! Background classification
//!
//! The classifier is an ordered rule table. Each [`Rule`] either produces a
//! conclusive [`Decision`] or passes; the first conclusive rule wins and the
//! fallback keeps the previous theme:
//!
//! 1. [`Rule::TopOfPage`]: near the top of a normal route, `Light`
//! 2. [`Rule::ForcedRoute`]: always-dark routes, `Dark`
//! 3. [`Rule::RegionOverride`]: first overlapping named region
//! 4. [`Rule::AncestorWalk`]: markers and colors from the element under the
//!    anchor point up to the document root
//!
//! Inside the walk each node is checked as: small elements skipped, light
//! marker, dark marker, transparent skipped, bright, dim, brand blue.
//! Nothing in here fails; an unreadable node is just inconclusive.

use navtint_core::{ColorSample, Point, Rect};
use navtint_layout::{ColorSampler, RenderHost};
use serde::Serialize;

use crate::config::{HintConfig, OverlayConfig, SmallElement, Thresholds};
use crate::registry::SectionRegistry;
use crate::theme::Theme;

/// Top-level rules, in evaluation order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    TopOfPage,
    ForcedRoute,
    RegionOverride,
    AncestorWalk,
}

/// Priority order of the rule table
pub const RULE_ORDER: [Rule; 4] = [
    Rule::TopOfPage,
    Rule::ForcedRoute,
    Rule::RegionOverride,
    Rule::AncestorWalk,
];

/// Which rule produced a decision
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "rule", content = "region", rename_all = "kebab-case")]
pub enum DecisionSource {
    TopOfPage,
    ForcedRoute,
    /// Named region override, by region id
    Region(String),
    LightHint,
    DarkHint,
    /// All channels above `light_min`
    Bright,
    /// All channels below `dark_max`
    Dim,
    BrandBlue,
    /// Nothing conclusive; previous theme kept
    Retained,
}

/// A theme together with the rule that chose it
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub theme: Theme,
    pub source: DecisionSource,
}

impl Decision {
    pub fn new(theme: Theme, source: DecisionSource) -> Self {
        Self { theme, source }
    }

    /// False only for the retain-previous fallback
    pub fn is_conclusive(&self) -> bool {
        self.source != DecisionSource::Retained
    }
}

/// Everything a classification needs besides the host
#[derive(Clone, Copy, Debug)]
pub struct ClassifyInput<'a> {
    /// Overlay bounding box, viewport space
    pub overlay: Rect,
    /// Point sampled for "what is behind the overlay"
    pub anchor: Point,
    pub route: &'a str,
    /// Theme to keep when nothing is conclusive
    pub previous: Theme,
}

impl<'a> ClassifyInput<'a> {
    /// Anchor at the overlay's center
    pub fn new(overlay: Rect, route: &'a str, previous: Theme) -> Self {
        Self {
            overlay,
            anchor: overlay.center(),
            route,
            previous,
        }
    }
}

/// The rule engine
#[derive(Clone, Debug)]
pub struct BackgroundClassifier {
    hero_height: f32,
    max_walk_depth: usize,
    thresholds: Thresholds,
    small_element: SmallElement,
    hints: HintConfig,
    registry: SectionRegistry,
}

impl BackgroundClassifier {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            hero_height: config.hero_height,
            max_walk_depth: config.max_walk_depth,
            thresholds: config.thresholds,
            small_element: config.small_element,
            hints: config.hints.clone(),
            registry: SectionRegistry::from_config(config),
        }
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    /// Run the rule table and return the first conclusive decision, or
    /// the previous theme
    pub fn classify<H: RenderHost>(&self, host: &H, input: &ClassifyInput<'_>) -> Decision {
        for rule in RULE_ORDER {
            if let Some(decision) = self.evaluate(rule, host, input) {
                tracing::trace!(?rule, ?decision, "rule concluded");
                return decision;
            }
        }
        tracing::trace!(previous = %input.previous, "no conclusive rule, keeping theme");
        Decision::new(input.previous, DecisionSource::Retained)
    }

    /// Evaluate a single rule in isolation
    pub fn evaluate<H: RenderHost>(
        &self,
        rule: Rule,
        host: &H,
        input: &ClassifyInput<'_>,
    ) -> Option<Decision> {
        match rule {
            Rule::TopOfPage => {
                let near_top = host.scroll_offset().y < self.hero_height;
                (near_top && !self.registry.is_always_dark(input.route))
                    .then(|| Decision::new(Theme::Light, DecisionSource::TopOfPage))
            }
            Rule::ForcedRoute => self
                .registry
                .route_override(input.route)
                .map(|theme| Decision::new(theme, DecisionSource::ForcedRoute)),
            Rule::RegionOverride => {
                let rule = self.registry.matching_rule(host, input.overlay)?;
                let theme = rule.forced.theme()?;
                Some(Decision::new(theme, DecisionSource::Region(rule.id.clone())))
            }
            Rule::AncestorWalk => self.walk(host, input.anchor),
        }
    }

    fn walk<H: RenderHost>(&self, host: &H, anchor: Point) -> Option<Decision> {
        let sampler = ColorSampler::new(host, self.max_walk_depth);
        sampler
            .walk_from(anchor)
            .find_map(|node| self.classify_node(&sampler, node))
    }

    fn classify_node<H: RenderHost>(
        &self,
        sampler: &ColorSampler<'_, H>,
        node: H::Node,
    ) -> Option<Decision> {
        let host = sampler.host();

        if host.bounds(node).is_some_and(|b| self.is_small(b)) {
            tracing::trace!(?node, "skipping small element");
            return None;
        }

        let labels = host.labels(node);
        if matches_any(&labels, &self.hints.light) {
            return Some(Decision::new(Theme::Light, DecisionSource::LightHint));
        }
        if matches_any(&labels, &self.hints.dark) {
            return Some(Decision::new(Theme::Dark, DecisionSource::DarkHint));
        }

        let sample = sampler.sample(node)?;
        if sample.is_transparent() {
            return None;
        }
        let decision = classify_sample(sample, &self.thresholds);
        tracing::trace!(?node, %sample, ?decision, "sampled background");
        decision
    }

    fn is_small(&self, bounds: Rect) -> bool {
        bounds.width() < self.small_element.min_width
            || bounds.height() < self.small_element.min_height
    }
}

/// Classify one opaque color sample. `None` means inconclusive.
pub fn classify_sample(sample: ColorSample, thresholds: &Thresholds) -> Option<Decision> {
    let ColorSample { r, g, b, .. } = sample;

    if r > thresholds.light_min && g > thresholds.light_min && b > thresholds.light_min {
        return Some(Decision::new(Theme::Light, DecisionSource::Bright));
    }
    if r < thresholds.dark_max && g < thresholds.dark_max && b < thresholds.dark_max {
        return Some(Decision::new(Theme::Dark, DecisionSource::Dim));
    }

    let margin = thresholds.blue_margin as u16;
    let blue_dominant = b as u16 >= r as u16 + margin && b as u16 >= g as u16 + margin;
    if blue_dominant && b >= thresholds.blue_min {
        return Some(Decision::new(Theme::Dark, DecisionSource::BrandBlue));
    }
    None
}

/// Markers are whole class/id tokens, so `bg-blue-50` does not match
/// `bg-blue-500`
fn matches_any(labels: &[&str], markers: &[String]) -> bool {
    markers
        .iter()
        .any(|marker| labels.iter().any(|label| label.eq_ignore_ascii_case(marker)))
}
