//! In-memory render tree
//!
//! A slotmap-backed tree of rendered blocks with document-space bounds and a
//! scrollable viewport. It answers every [`RenderHost`] query and is the
//! host used by fixtures, the CLI, and tests.

use navtint_core::{Point, Rect, Size};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::host::{label_matches, RenderHost};

new_key_type! {
    pub struct NodeId;
}

/// A rendered block
#[derive(Clone, Debug, Default)]
pub struct RenderNode {
    /// Element id, e.g. `faq`
    pub element_id: Option<String>,
    /// Class names, e.g. `bg-white`
    pub classes: SmallVec<[String; 2]>,
    /// Resolved background color string
    pub background: Option<String>,
    /// Document-space bounds
    pub bounds: Rect,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

impl RenderNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the element id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    /// Add a class name
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the resolved background color
    pub fn with_background(mut self, css: impl Into<String>) -> Self {
        self.background = Some(css.into());
        self
    }

    /// Set document-space bounds
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// Render tree with a single document root
pub struct RenderTree {
    nodes: SlotMap<NodeId, RenderNode>,
    root: NodeId,
    viewport: Size,
    scroll: Point,
}

impl RenderTree {
    /// Create an empty document for the given viewport
    pub fn new(viewport: Size) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(RenderNode {
            bounds: viewport.to_rect(),
            attached: true,
            ..RenderNode::default()
        });
        Self {
            nodes,
            root,
            viewport,
            scroll: Point::ZERO,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Total document height (at least the viewport height)
    pub fn document_height(&self) -> f32 {
        self.nodes
            .get(self.root)
            .map(|root| root.bounds.height())
            .unwrap_or(self.viewport.height)
    }

    pub fn node(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut RenderNode> {
        self.nodes.get_mut(id)
    }

    /// Number of nodes including the root and detached nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Insert a node without attaching it
    pub fn create_node(&mut self, node: RenderNode) -> NodeId {
        self.nodes.insert(RenderNode {
            parent: None,
            children: Vec::new(),
            attached: false,
            ..node
        })
    }

    /// Create a node and append it to `parent` in one step
    pub fn insert_child(&mut self, parent: NodeId, node: RenderNode) -> NodeId {
        let id = self.create_node(node);
        self.append_child(parent, id);
        id
    }

    /// Append `child` as the last (topmost painted) child of `parent`.
    /// Moving a node under itself or one of its descendants is ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if child == self.root
            || !self.nodes.contains_key(parent)
            || !self.nodes.contains_key(child)
            || self.is_ancestor_or_self(child, parent)
        {
            tracing::trace!(?parent, ?child, "rejected append");
            return;
        }
        self.detach(child);

        let attached = self.nodes[parent].attached;
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        self.set_attached(child, attached);

        let bounds = self.nodes[child].bounds;
        self.grow_root(bounds);
    }

    /// Detach a subtree from the document. The nodes stay addressable but
    /// answer no host queries until re-attached.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        self.nodes[id].parent = None;
        self.set_attached(id, false);
    }

    /// Remove a subtree entirely
    pub fn remove_node(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
            }
        }
    }

    /// Update a node's document-space bounds
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.bounds = bounds;
            if node.attached {
                self.grow_root(bounds);
            }
        }
    }

    /// Scroll the viewport, clamped to the document
    pub fn scroll_to(&mut self, x: f32, y: f32) {
        let max_y = (self.document_height() - self.viewport.height).max(0.0);
        self.scroll = Point::new(x.max(0.0), y.clamp(0.0, max_y));
    }

    /// Look up an attached node by exact element id
    pub fn get_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.document_order()
            .find(|id| self.nodes[*id].element_id.as_deref() == Some(element_id))
    }

    /// Attached nodes in document (pre-order) order
    pub fn document_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            if let Some(node) = self.nodes.get(id) {
                stack.extend(node.children.iter().rev().copied());
            }
            Some(id)
        })
    }

    /// Deepest attached node containing a document-space point. Later
    /// siblings paint over earlier ones.
    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        let root = self.nodes.get(self.root)?;
        if !root.bounds.contains(point) {
            return None;
        }

        let mut current = self.root;
        'descend: loop {
            for child in self.nodes[current].children.iter().rev() {
                if self.nodes[*child].bounds.contains(point) {
                    current = *child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    fn set_attached(&mut self, id: NodeId, attached: bool) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current) {
                node.attached = attached;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    fn grow_root(&mut self, bounds: Rect) {
        let root = &mut self.nodes[self.root];
        let bottom = root.bounds.bottom().max(bounds.bottom());
        let right = root.bounds.right().max(bounds.right());
        root.bounds = Rect::new(0.0, 0.0, right, bottom);
    }

    fn attached(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.get(id).filter(|n| n.attached)
    }
}

impl RenderHost for RenderTree {
    type Node = NodeId;

    fn element_at(&self, point: Point) -> Option<NodeId> {
        self.hit_test(point.offset(self.scroll.x, self.scroll.y))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.attached(node)?.parent
    }

    fn background(&self, node: NodeId) -> Option<String> {
        self.attached(node)?.background.clone()
    }

    fn bounds(&self, node: NodeId) -> Option<Rect> {
        let node = self.attached(node)?;
        Some(node.bounds.offset(-self.scroll.x, -self.scroll.y))
    }

    fn labels(&self, node: NodeId) -> SmallVec<[&str; 4]> {
        let Some(node) = self.attached(node) else {
            return SmallVec::new();
        };
        node.element_id
            .as_deref()
            .into_iter()
            .chain(node.classes.iter().map(String::as_str))
            .collect()
    }

    fn find_by_fragment(&self, fragment: &str) -> Option<NodeId> {
        self.document_order()
            .find(|id| self.labels(*id).iter().any(|l| label_matches(l, fragment)))
    }

    fn scroll_offset(&self) -> Point {
        self.scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (RenderTree, NodeId, NodeId, NodeId) {
        let mut tree = RenderTree::new(Size::new(1280.0, 800.0));
        let root = tree.root();
        let hero = tree.insert_child(
            root,
            RenderNode::new()
                .with_id("hero")
                .with_background("rgb(255, 255, 255)")
                .with_bounds(Rect::new(0.0, 0.0, 1280.0, 700.0)),
        );
        let faq = tree.insert_child(
            root,
            RenderNode::new()
                .with_id("faq-section")
                .with_class("bg-white")
                .with_bounds(Rect::new(0.0, 700.0, 1280.0, 900.0)),
        );
        let button = tree.insert_child(
            faq,
            RenderNode::new()
                .with_class("btn-primary")
                .with_background("rgb(29, 78, 216)")
                .with_bounds(Rect::new(600.0, 720.0, 80.0, 30.0)),
        );
        (tree, hero, faq, button)
    }

    #[test]
    fn test_hit_test_picks_deepest() {
        let (tree, hero, faq, button) = page();

        assert_eq!(tree.hit_test(Point::new(10.0, 10.0)), Some(hero));
        assert_eq!(tree.hit_test(Point::new(10.0, 800.0)), Some(faq));
        assert_eq!(tree.hit_test(Point::new(620.0, 730.0)), Some(button));
        assert_eq!(tree.hit_test(Point::new(10.0, 5000.0)), None);
    }

    #[test]
    fn test_later_sibling_paints_on_top() {
        let mut tree = RenderTree::new(Size::new(100.0, 100.0));
        let root = tree.root();
        let bottom = RenderNode::new().with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.insert_child(root, bottom.clone());
        let top = tree.insert_child(root, bottom);

        assert_eq!(tree.hit_test(Point::new(50.0, 50.0)), Some(top));
    }

    #[test]
    fn test_scroll_maps_viewport_to_document() {
        let (mut tree, _, faq, _) = page();
        tree.scroll_to(0.0, 700.0);

        assert_eq!(tree.element_at(Point::new(10.0, 32.0)), Some(faq));
        assert_eq!(tree.bounds(faq), Some(Rect::new(0.0, 0.0, 1280.0, 900.0)));
        assert_eq!(tree.scroll_offset(), Point::new(0.0, 700.0));

        // Clamped to document height - viewport height
        tree.scroll_to(0.0, 10_000.0);
        assert_eq!(tree.scroll_offset().y, 1600.0 - 800.0);
    }

    #[test]
    fn test_detached_nodes_answer_nothing() {
        let (mut tree, _, faq, button) = page();
        tree.detach(faq);

        assert_eq!(tree.background(button), None);
        assert_eq!(tree.bounds(faq), None);
        assert_eq!(tree.parent(button), None);
        assert!(tree.labels(faq).is_empty());
        assert_eq!(tree.find_by_fragment("faq"), None);

        tree.append_child(tree.root(), faq);
        assert_eq!(tree.find_by_fragment("FAQ"), Some(faq));
        assert!(tree.background(button).is_some());
    }

    #[test]
    fn test_labels_and_lookup() {
        let (mut tree, hero, faq, button) = page();

        assert_eq!(tree.labels(faq).as_slice(), &["faq-section", "bg-white"]);
        assert_eq!(tree.labels(button).as_slice(), &["btn-primary"]);
        assert_eq!(tree.get_by_id("hero"), Some(hero));
        assert_eq!(tree.find_by_fragment("btn"), Some(button));

        tree.remove_node(faq);
        assert!(tree.node(button).is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_append_under_descendant_is_ignored() {
        let mut tree = RenderTree::new(Size::new(100.0, 100.0));
        let root = tree.root();
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let a = tree.insert_child(root, RenderNode::new().with_id("a").with_bounds(bounds));
        let b = tree.insert_child(a, RenderNode::new().with_id("b").with_bounds(bounds));

        tree.append_child(b, a);
        tree.append_child(a, a);
        tree.append_child(b, root);

        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(b), Some(a));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.document_order().count(), 3);
        assert!(tree.node(a).unwrap().is_attached());
        assert_eq!(tree.hit_test(Point::new(50.0, 50.0)), Some(b));
    }
}
