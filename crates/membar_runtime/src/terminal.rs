//! ANSI terminal canvas

use membar_core::Rgba8;
use membar_ui::glam::IVec2;
use membar_ui::{Canvas, Rect};

/// Canvas that prints the bar's top row: each column is a cell, tooltips are
/// collected as text.
pub struct TerminalCanvas {
    cells: Vec<Option<Rgba8>>,
    tooltip: Option<String>,
}

impl TerminalCanvas {
    pub fn new(width: usize) -> Self {
        Self {
            cells: vec![None; width],
            tooltip: None,
        }
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.tooltip = None;
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for cell in &self.cells {
            match cell {
                Some(color) => out.push_str(&swatch(*color)),
                None => out.push(' '),
            }
        }
        out.push('\n');
        if let Some(tooltip) = &self.tooltip {
            out.push_str(tooltip);
            out.push('\n');
        }
        out
    }
}

/// A single colored block.
pub fn swatch(color: Rgba8) -> String {
    format!("\x1b[48;2;{};{};{}m \x1b[0m", color.r, color.g, color.b)
}

impl Canvas for TerminalCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        // Only rects covering row 0 show up; tooltip backgrounds sit below it.
        if rect.y > 0 || rect.bottom() <= 0 {
            return;
        }
        let start = rect.x.max(0) as usize;
        let end = (rect.right().max(0) as usize).min(self.cells.len());
        for cell in self.cells.iter_mut().take(end).skip(start) {
            *cell = Some(color);
        }
    }

    fn measure_text(&self, text: &str) -> IVec2 {
        let width = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        IVec2::new(width as i32, text.lines().count() as i32)
    }

    fn draw_text(&mut self, text: &str, _origin: IVec2, _color: Rgba8, _border: Rgba8) {
        self.tooltip = Some(text.to_string());
    }
}
