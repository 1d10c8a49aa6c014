//! Tooltip placement

use crate::geometry::Rect;
use glam::IVec2;

/// Distance from the pointer to the tooltip's text origin.
pub const CURSOR_OFFSET: i32 = 16;
/// Space kept free below the tooltip.
pub const BOTTOM_MARGIN: i32 = 30;
/// Space kept free between the tooltip and the parent's right edge.
pub const RIGHT_MARGIN: i32 = 40;
/// Background padding around the text.
pub const PADDING: i32 = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TooltipPlacement {
    pub text_origin: IVec2,
    pub background: Rect,
}

/// Places a tooltip of `text_size` next to `pointer`, pulled back inside the
/// parent's right edge and above the bottom of the screen.
pub fn place_tooltip(
    pointer: IVec2,
    text_size: IVec2,
    parent: Rect,
    screen_height: i32,
) -> TooltipPlacement {
    let mut origin = pointer + IVec2::splat(CURSOR_OFFSET);
    origin.y = origin.y.min(screen_height - BOTTOM_MARGIN);
    origin.x = origin.x.min(parent.right() - text_size.x - RIGHT_MARGIN);

    TooltipPlacement {
        text_origin: origin,
        background: Rect::from_origin_size(origin, text_size).inflate(PADDING, PADDING),
    }
}
