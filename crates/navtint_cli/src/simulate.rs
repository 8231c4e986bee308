//! Scroll a page fixture under a mounted overlay

use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use navtint_core::{Event, EventDispatcher, Rect};
use navtint_layout::RenderTree;
use navtint_theme::{DecisionSource, NavOverlay, OverlayConfig, Theme};
use serde::Serialize;

const OVERLAY_TARGET: u64 = 1;

/// Theme chosen at one scroll offset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRow {
    pub offset: f32,
    pub theme: Theme,
    pub decided_by: DecisionSource,
}

/// Evenly spaced offsets covering the whole scroll range
pub fn default_offsets(tree: &RenderTree, step: f32) -> Vec<f32> {
    let max = (tree.document_height() - tree.viewport().height).max(0.0);
    let step = step.max(1.0);
    let count = (max / step).floor() as usize;
    let mut offsets: Vec<f32> = (0..=count).map(|i| i as f32 * step).collect();
    if offsets.last().is_some_and(|last| *last < max) {
        offsets.push(max);
    }
    offsets
}

/// Mount an overlay on `tree` and record the theme after each scroll step.
///
/// Every step goes through the event path the browser integration uses: a
/// scroll event followed by a frame.
pub fn simulate(
    tree: RenderTree,
    config: &OverlayConfig,
    route: &str,
    offsets: &[f32],
    overlay_height: f32,
) -> Result<Vec<SimulationRow>> {
    let bounds = Rect::new(0.0, 0.0, tree.viewport().width, overlay_height);
    let host = Arc::new(RwLock::new(tree));
    let mut dispatcher = EventDispatcher::new();
    let overlay = NavOverlay::mount_with_config(
        host.clone(),
        bounds,
        route,
        config,
        &mut dispatcher,
        OVERLAY_TARGET,
    );

    let mut rows = Vec::with_capacity(offsets.len());
    for &offset in offsets {
        host.write()
            .map_err(|_| anyhow!("render host lock poisoned"))?
            .scroll_to(0.0, offset);
        dispatcher.dispatch(&mut Event::scroll(OVERLAY_TARGET, 0.0, offset));
        dispatcher.dispatch(&mut Event::frame(OVERLAY_TARGET, 0));

        let decision = overlay
            .last_decision()
            .ok_or_else(|| anyhow!("overlay produced no decision at offset {offset}"))?;
        rows.push(SimulationRow {
            offset,
            theme: decision.theme,
            decided_by: decision.source,
        });
    }

    overlay.detach(&mut dispatcher);
    Ok(rows)
}

/// Short human-readable name for a decision source
pub fn describe(source: &DecisionSource) -> String {
    match source {
        DecisionSource::TopOfPage => "top of page".into(),
        DecisionSource::ForcedRoute => "forced route".into(),
        DecisionSource::Region(id) => format!("region {id}"),
        DecisionSource::LightHint => "light class hint".into(),
        DecisionSource::DarkHint => "dark class hint".into(),
        DecisionSource::Bright => "bright background".into(),
        DecisionSource::Dim => "dim background".into(),
        DecisionSource::BrandBlue => "brand blue background".into(),
        DecisionSource::Retained => "retained".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navtint_layout::PageFixture;

    fn tree() -> RenderTree {
        PageFixture::from_toml_str(include_str!("../fixtures/landing.toml"))
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_offsets_reach_bottom() {
        let tree = tree();
        let offsets = default_offsets(&tree, 500.0);
        let max = tree.document_height() - tree.viewport().height;
        assert_eq!(offsets.first(), Some(&0.0));
        assert_eq!(offsets.last(), Some(&max));
    }

    #[test]
    fn test_simulate_landing_page() {
        let rows = simulate(
            tree(),
            &OverlayConfig::default(),
            "/",
            &[0.0, 900.0, 1300.0],
            64.0,
        )
        .unwrap();

        let themes: Vec<_> = rows.iter().map(|r| r.theme).collect();
        assert_eq!(themes, vec![Theme::Light, Theme::Dark, Theme::Dark]);
        assert_eq!(rows[0].decided_by, DecisionSource::TopOfPage);
        assert_eq!(rows[2].decided_by, DecisionSource::BrandBlue);
    }

    #[test]
    fn test_simulate_forced_route() {
        let rows = simulate(tree(), &OverlayConfig::default(), "/launch/", &[0.0], 64.0).unwrap();
        assert_eq!(rows[0].theme, Theme::Dark);
        assert_eq!(describe(&rows[0].decided_by), "forced route");
    }

    #[test]
    fn test_rows_serialize_with_rule_tag() {
        let row = SimulationRow {
            offset: 2000.0,
            theme: Theme::Light,
            decided_by: DecisionSource::Region("faq".into()),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["theme"], "light");
        assert_eq!(json["decided_by"]["rule"], "region");
        assert_eq!(json["decided_by"]["region"], "faq");
    }
}
