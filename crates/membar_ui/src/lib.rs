//! Membar UI
//!
//! Proportional bar layout, hover resolution and the memory bar widget.
//! Drawing itself goes through the host's [`Canvas`].

pub mod geometry;
pub mod layout;
pub mod tooltip;
pub mod widget;

pub use glam;

pub use geometry::Rect;
pub use layout::{hit_test, layout_segments, SegmentSlot};
pub use tooltip::{place_tooltip, TooltipPlacement};
pub use widget::{Canvas, DrawOutcome, FrameInput, MemoryBar};
