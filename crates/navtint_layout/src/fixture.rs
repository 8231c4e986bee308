//! TOML page fixtures
//!
//! A fixture describes a page as nested blocks that stack vertically inside
//! their parent:
//!
//! ```toml
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [[block]]
//! id = "hero"
//! background = "rgb(255, 255, 255)"
//! height = 700
//!
//! [[block]]
//! id = "faq"
//! classes = ["bg-white"]
//!
//! [[block.block]]
//! background = "rgb(20, 20, 20)"
//! height = 400
//! ```
//!
//! A block without a height takes the sum of its children's heights.

use std::path::{Path, PathBuf};

use navtint_core::{Rect, Size};
use serde::Deserialize;
use thiserror::Error;

use crate::tree::{NodeId, RenderNode, RenderTree};

/// Fixture loading errors
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("block {0} has no height and no children")]
    MissingHeight(String),
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FixtureViewport {
    pub width: f32,
    pub height: f32,
}

impl Default for FixtureViewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// A whole page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageFixture {
    #[serde(default)]
    pub viewport: FixtureViewport,
    #[serde(default, rename = "block")]
    pub blocks: Vec<BlockFixture>,
}

/// One rendered block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockFixture {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub height: Option<f32>,
    /// Defaults to the parent's width
    #[serde(default)]
    pub width: Option<f32>,
    /// Horizontal offset inside the parent
    #[serde(default)]
    pub x: f32,
    #[serde(default, rename = "block")]
    pub children: Vec<BlockFixture>,
}

impl PageFixture {
    /// Parse a fixture from TOML source
    pub fn from_toml_str(source: &str) -> Result<Self, FixtureError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a fixture file
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let source = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Build a render tree with every block stacked in document order
    pub fn build(&self) -> Result<RenderTree, FixtureError> {
        let viewport = Size::new(self.viewport.width, self.viewport.height);
        let mut tree = RenderTree::new(viewport);
        let root = tree.root();

        let mut cursor = 0.0;
        for block in &self.blocks {
            cursor += place_block(&mut tree, root, block, 0.0, cursor, viewport.width)?;
        }
        tracing::debug!(
            nodes = tree.len(),
            height = tree.document_height(),
            "built page fixture"
        );
        Ok(tree)
    }
}

/// Place `block` at (`x`, `y`) under `parent`, returning its height
fn place_block(
    tree: &mut RenderTree,
    parent: NodeId,
    block: &BlockFixture,
    x: f32,
    y: f32,
    parent_width: f32,
) -> Result<f32, FixtureError> {
    let mut node = RenderNode::new();
    if let Some(id) = &block.id {
        node = node.with_id(id.clone());
    }
    for class in &block.classes {
        node = node.with_class(class.clone());
    }
    if let Some(background) = &block.background {
        node = node.with_background(background.clone());
    }

    let x = x + block.x;
    let width = block.width.unwrap_or(parent_width);
    let id = tree.insert_child(parent, node);

    let mut cursor = y;
    for child in &block.children {
        cursor += place_block(tree, id, child, x, cursor, width)?;
    }

    let height = match block.height {
        Some(height) => height,
        None if !block.children.is_empty() => cursor - y,
        None => {
            let name = block.id.clone().unwrap_or_else(|| "<anonymous>".into());
            return Err(FixtureError::MissingHeight(name));
        }
    };
    tree.set_bounds(id, Rect::new(x, y, width, height));
    Ok(height)
}
