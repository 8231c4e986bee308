//! Background color sampling
//!
//! [`ColorSampler`] turns host queries into [`ColorSample`]s and walks from
//! the topmost element at a point up toward the document root.

use navtint_core::{ColorSample, Point};

use crate::css_color::parse_color;
use crate::host::RenderHost;

/// Reads rendered backgrounds from a host
pub struct ColorSampler<'h, H: RenderHost> {
    host: &'h H,
    max_depth: usize,
}

impl<'h, H: RenderHost> ColorSampler<'h, H> {
    /// Create a sampler that visits at most `max_depth` nodes per walk
    pub fn new(host: &'h H, max_depth: usize) -> Self {
        Self { host, max_depth }
    }

    pub fn host(&self) -> &'h H {
        self.host
    }

    /// Walk from the topmost element at `point` toward the root
    pub fn walk_from(&self, point: Point) -> AncestorWalk<'h, H> {
        AncestorWalk {
            host: self.host,
            next: self.host.element_at(point),
            remaining: self.max_depth,
        }
    }

    /// Read a node's own background. `None` when the node has no readable
    /// style or the string does not parse; both mean "inconclusive".
    pub fn sample(&self, node: H::Node) -> Option<ColorSample> {
        let css = self.host.background(node)?;
        match parse_color(&css) {
            Ok(sample) => Some(sample),
            Err(err) => {
                tracing::trace!(?node, %err, "unreadable background");
                None
            }
        }
    }
}

/// Iterator over a node and its ancestors, bounded in depth
pub struct AncestorWalk<'h, H: RenderHost> {
    host: &'h H,
    next: Option<H::Node>,
    remaining: usize,
}

impl<H: RenderHost> Iterator for AncestorWalk<'_, H> {
    type Item = H::Node;

    fn next(&mut self) -> Option<H::Node> {
        let current = self.next?;
        if self.remaining == 0 {
            tracing::trace!(?current, "ancestor walk hit depth cap");
            self.next = None;
            return None;
        }
        self.remaining -= 1;
        self.next = self.host.parent(current);
        Some(current)
    }
}
