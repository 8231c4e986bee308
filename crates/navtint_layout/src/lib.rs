//! navtint Layout
//!
//! The rendering-host side of the overlay engine:
//!
//! - [`RenderHost`]: the three queries the engine needs from a renderer
//!   (topmost element at a point, resolved background, bounding box) plus
//!   ancestry and identifying labels
//! - [`RenderTree`]: an in-memory host with paint-order hit testing
//! - [`PageFixture`]: TOML page descriptions that build a [`RenderTree`]
//! - [`ColorSampler`]: reads backgrounds and walks ancestor chains
//! - [`css_color`]: computed CSS color string parsing

pub mod css_color;
pub mod fixture;
pub mod host;
pub mod sampler;
pub mod tree;

pub use css_color::{parse_color, ColorParseError};
pub use fixture::{BlockFixture, FixtureError, PageFixture};
pub use host::RenderHost;
pub use sampler::{AncestorWalk, ColorSampler};
pub use tree::{NodeId, RenderNode, RenderTree};
