//! navtint Core
//!
//! Foundational primitives shared by the navtint crates:
//!
//! - **Geometry**: points, sizes and rectangles in viewport or document space
//! - **Colors**: float colors for renderers and 8-bit samples read from a host
//! - **Event Dispatch**: scroll, frame and route events with removable handlers
//!
//! # Example
//!
//! ```rust
//! use navtint_core::{Point, Rect};
//!
//! let overlay = Rect::new(0.0, 0.0, 1280.0, 64.0);
//! assert_eq!(overlay.center(), Point::new(640.0, 32.0));
//! assert!(overlay.intersects(&Rect::new(0.0, 60.0, 1280.0, 400.0)));
//! ```

pub mod color;
pub mod events;
pub mod geometry;

pub use color::{Color, ColorSample};
pub use events::{Event, EventData, EventDispatcher, EventType, HandlerId};
pub use geometry::{Point, Rect, Size};
