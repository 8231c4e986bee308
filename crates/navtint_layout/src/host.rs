//! Rendering host abstraction

use navtint_core::{Point, Rect};
use smallvec::SmallVec;

/// Queries the overlay engine issues against whatever renders the page.
///
/// All geometry is in viewport space. A node that has been detached or
/// cannot be styled answers `None`; callers treat that as inconclusive.
pub trait RenderHost {
    /// Lightweight node handle
    type Node: Copy + Eq + std::fmt::Debug;

    /// Topmost rendered element at a viewport point
    fn element_at(&self, point: Point) -> Option<Self::Node>;

    /// Parent container, `None` at the document root
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Resolved background color string, e.g. `rgb(255, 255, 255)`
    fn background(&self, node: Self::Node) -> Option<String>;

    /// Bounding rectangle in viewport space
    fn bounds(&self, node: Self::Node) -> Option<Rect>;

    /// Identifying hints: element id followed by class names
    fn labels(&self, node: Self::Node) -> SmallVec<[&str; 4]>;

    /// First attached node (document order) whose id or a class name
    /// contains `fragment`, ignoring ASCII case
    fn find_by_fragment(&self, fragment: &str) -> Option<Self::Node>;

    /// Current document scroll offset
    fn scroll_offset(&self) -> Point;
}

/// Case-insensitive substring test shared by hosts and rule matchers
pub fn label_matches(label: &str, fragment: &str) -> bool {
    if fragment.is_empty() {
        return false;
    }
    label
        .to_ascii_lowercase()
        .contains(&fragment.to_ascii_lowercase())
}
