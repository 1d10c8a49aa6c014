//! Segment colors

use serde::{Deserialize, Serialize};

/// 8-bit RGBA color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::rgb(255, 255, 255);
    pub const BLACK: Rgba8 = Rgba8::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Component colors, reused cyclically in segment order.
pub const PALETTE: [Rgba8; 6] = [
    Rgba8::rgb(232, 76, 61),   // red
    Rgba8::rgb(155, 88, 181),  // purple
    Rgba8::rgb(27, 188, 155),  // aqua
    Rgba8::rgb(243, 156, 17),  // orange
    Rgba8::rgb(45, 204, 112),  // green
    Rgba8::rgb(241, 196, 15),  // yellow
];

/// Host memory not attributed to any component (deep sky blue).
pub const NON_COMPONENT_COLOR: Rgba8 = Rgba8::rgb(0, 191, 255);

/// Memory still available to the host (gray).
pub const REMAINING_COLOR: Rgba8 = Rgba8::rgb(128, 128, 128);

/// Color of the `index`-th component segment.
pub fn palette_color(index: usize) -> Rgba8 {
    PALETTE[index % PALETTE.len()]
}
