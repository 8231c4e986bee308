//! Route and named-section overrides
//!
//! Overrides win over raw color sampling. Route-level forces are checked
//! first, then named regions in their configured order. Regions are found by
//! id/class fragment, never by fixed geometry, because their rendered
//! position moves whenever content reflows.

use navtint_core::Rect;
use navtint_layout::RenderHost;
use smallvec::SmallVec;

use crate::config::OverlayConfig;
use crate::theme::{ForcedTheme, Theme};

/// A named region that forces a theme while the overlay overlaps it
#[derive(Clone, Debug, PartialEq)]
pub struct RegionRule {
    pub id: String,
    pub matchers: SmallVec<[String; 2]>,
    pub forced: ForcedTheme,
}

impl RegionRule {
    pub fn new(id: impl Into<String>, forced: impl Into<ForcedTheme>) -> Self {
        Self {
            id: id.into(),
            matchers: SmallVec::new(),
            forced: forced.into(),
        }
    }

    pub fn with_matcher(mut self, matcher: impl Into<String>) -> Self {
        self.matchers.push(matcher.into());
        self
    }

    /// True when any node identified by a matcher currently overlaps the
    /// overlay (grown by `padding`). A region missing from the page never
    /// matches.
    pub fn bounds_test<H: RenderHost>(&self, host: &H, overlay: Rect, padding: f32) -> bool {
        let reach = overlay.expand(padding);
        self.matchers
            .iter()
            .filter_map(|matcher| host.find_by_fragment(matcher))
            .filter_map(|node| host.bounds(node))
            .any(|bounds| reach.intersects(&bounds))
    }
}

/// Ordered override table
#[derive(Clone, Debug, Default)]
pub struct SectionRegistry {
    always_dark_routes: Vec<String>,
    rules: Vec<RegionRule>,
    padding: f32,
}

impl SectionRegistry {
    pub fn new(padding: f32) -> Self {
        Self {
            padding,
            ..Self::default()
        }
    }

    /// Build the table from configuration, preserving region order
    pub fn from_config(config: &OverlayConfig) -> Self {
        let mut registry = Self::new(config.region_padding);
        for route in &config.always_dark_routes {
            registry = registry.with_dark_route(route);
        }
        for region in &config.regions {
            let rule = region
                .effective_matchers()
                .into_iter()
                .fold(RegionRule::new(region.id.clone(), region.theme), |rule, m| {
                    rule.with_matcher(m)
                });
            registry = registry.with_rule(rule);
        }
        registry
    }

    /// Append a rule at the lowest priority
    pub fn with_rule(mut self, rule: RegionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Mark a route as dark at every scroll offset
    pub fn with_dark_route(mut self, route: &str) -> Self {
        self.always_dark_routes
            .push(normalize_route(route).to_string());
        self
    }

    pub fn rules(&self) -> &[RegionRule] {
        &self.rules
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn is_always_dark(&self, route: &str) -> bool {
        let route = normalize_route(route);
        self.always_dark_routes.iter().any(|r| r == route)
    }

    /// Route-level force, if any
    pub fn route_override(&self, route: &str) -> Option<Theme> {
        self.is_always_dark(route).then_some(Theme::Dark)
    }

    /// First rule, in priority order, whose region overlaps the overlay
    pub fn matching_rule<H: RenderHost>(&self, host: &H, overlay: Rect) -> Option<&RegionRule> {
        self.rules
            .iter()
            .find(|rule| rule.bounds_test(host, overlay, self.padding))
    }

    /// Resolve the forced theme for the overlay's current position:
    /// route force, then the first overlapping region, then nothing.
    pub fn resolve<H: RenderHost>(&self, host: &H, route: &str, overlay: Rect) -> Option<Theme> {
        self.route_override(route).or_else(|| {
            self.matching_rule(host, overlay)
                .and_then(|rule| rule.forced.theme())
        })
    }
}

/// Strip query/fragment and trailing slashes; the empty path is `/`
pub fn normalize_route(route: &str) -> &str {
    let path = route
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navtint_core::Size;
    use navtint_layout::{RenderNode, RenderTree};

    const OVERLAY: Rect = Rect::new(0.0, 0.0, 1280.0, 64.0);

    fn page() -> RenderTree {
        let mut tree = RenderTree::new(Size::new(1280.0, 800.0));
        let root = tree.root();
        tree.insert_child(
            root,
            RenderNode::new()
                .with_id("pricing")
                .with_bounds(Rect::new(0.0, 0.0, 1280.0, 1000.0)),
        );
        tree.insert_child(
            root,
            RenderNode::new()
                .with_id("faq-section")
                .with_bounds(Rect::new(0.0, 1000.0, 1280.0, 1000.0)),
        );
        tree
    }

    fn registry() -> SectionRegistry {
        SectionRegistry::new(8.0)
            .with_dark_route("/launch/")
            .with_rule(RegionRule::new("pricing", Theme::Light).with_matcher("pricing"))
            .with_rule(RegionRule::new("faq", Theme::Dark).with_matcher("faq"))
    }

    #[test]
    fn test_normalize_route() {
        assert_eq!(normalize_route(""), "/");
        assert_eq!(normalize_route("/"), "/");
        assert_eq!(normalize_route("/launch/"), "/launch");
        assert_eq!(normalize_route("/launch?ref=ad#top"), "/launch");
    }

    #[test]
    fn test_route_force_beats_regions() {
        let tree = page();
        let registry = registry();

        assert!(registry.is_always_dark("/launch"));
        assert_eq!(registry.resolve(&tree, "/launch", OVERLAY), Some(Theme::Dark));
        assert_eq!(registry.resolve(&tree, "/", OVERLAY), Some(Theme::Light));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut tree = page();
        let registry = registry();

        // Overlay straddles the pricing/faq boundary; pricing is listed first
        tree.scroll_to(0.0, 970.0);
        assert_eq!(
            registry.matching_rule(&tree, OVERLAY).map(|r| r.id.as_str()),
            Some("pricing")
        );

        tree.scroll_to(0.0, 1200.0);
        assert_eq!(registry.resolve(&tree, "/", OVERLAY), Some(Theme::Dark));
    }

    #[test]
    fn test_padding_tolerance() {
        let mut tree = page();
        let faq_only = SectionRegistry::new(8.0)
            .with_rule(RegionRule::new("faq", Theme::Light).with_matcher("faq"));

        // FAQ starts 4px below the overlay's bottom edge
        tree.scroll_to(0.0, 1000.0 - 68.0);
        assert_eq!(faq_only.resolve(&tree, "/", OVERLAY), Some(Theme::Light));

        // 20px below is out of reach
        tree.scroll_to(0.0, 1000.0 - 84.0);
        assert_eq!(faq_only.resolve(&tree, "/", OVERLAY), None);
    }

    #[test]
    fn test_missing_region_never_matches() {
        let tree = page();
        let registry = SectionRegistry::new(8.0)
            .with_rule(RegionRule::new("contact", Theme::Light).with_matcher("contact"));

        assert_eq!(registry.resolve(&tree, "/", OVERLAY), None);
    }

    #[test]
    fn test_unforced_region_shadows_later_rules() {
        let tree = page();
        let registry = SectionRegistry::new(0.0)
            .with_rule(RegionRule::new("pricing", ForcedTheme::None).with_matcher("pricing"))
            .with_rule(RegionRule::new("all", Theme::Dark).with_matcher("pricing"));

        assert_eq!(
            registry.matching_rule(&tree, OVERLAY).map(|r| r.id.as_str()),
            Some("pricing")
        );
        assert_eq!(registry.resolve(&tree, "/", OVERLAY), None);
    }

    #[test]
    fn test_from_config_keeps_order() {
        let registry = SectionRegistry::from_config(&OverlayConfig::default());
        let ids: Vec<_> = registry.rules().iter().map(|r| r.id.as_str()).collect();

        assert_eq!(ids, vec!["pricing", "faq", "contact"]);
        assert!(registry.is_always_dark("/launch/"));
        assert_eq!(registry.padding(), 8.0);
    }
}
