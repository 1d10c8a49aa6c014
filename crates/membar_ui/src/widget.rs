//! Memory bar widget

use crate::geometry::Rect;
use crate::layout::{hit_test, layout_segments};
use crate::tooltip::place_tooltip;
use glam::IVec2;
use membar_core::{RecalculationScheduler, Rgba8};

/// Tooltip background (UI blue).
pub const TOOLTIP_BACKGROUND: Rgba8 = Rgba8::rgb(73, 94, 171);
pub const TOOLTIP_TEXT: Rgba8 = Rgba8::WHITE;
pub const TOOLTIP_BORDER: Rgba8 = Rgba8::BLACK;

/// Fill for segments whose value went negative (estimates exceed a measured figure).
pub const ESTIMATE_ARTIFACT_COLOR: Rgba8 = Rgba8::rgb(255, 0, 255);

/// Default bar height in pixels.
pub const DEFAULT_BAR_HEIGHT: u32 = 20;

/// Drawing primitives supplied by the host UI.
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect, color: Rgba8);

    /// Size of `text` when drawn with the tooltip font.
    fn measure_text(&self, text: &str) -> IVec2;

    fn draw_text(&mut self, text: &str, origin: IVec2, color: Rgba8, border: Rgba8);
}

/// Per-frame inputs from the host UI.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameInput {
    /// Inner bounds of the bar.
    pub bounds: Rect,
    pub pointer: IVec2,
    /// Bounds of the element containing the bar; tooltips stay inside it.
    pub parent: Rect,
    pub screen_height: i32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    /// No fresh segment list; nothing was drawn.
    Skipped,
    Drawn {
        segments: usize,
        hovered: Option<usize>,
    },
}

/// A memory bar owned by one UI element.
#[derive(Debug, Clone)]
pub struct MemoryBar {
    scheduler: RecalculationScheduler,
    height: u32,
}

impl MemoryBar {
    pub fn new(scheduler: RecalculationScheduler) -> Self {
        Self {
            scheduler,
            height: DEFAULT_BAR_HEIGHT,
        }
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bar bounds inside `container`: full width, [`height`](Self::height)
    /// tall, anchored at the container's top-left corner.
    pub fn bounds_in(&self, container: Rect) -> Rect {
        let height = i32::try_from(self.height).unwrap_or(i32::MAX);
        Rect::new(container.x, container.y, container.width, height)
    }

    pub fn scheduler(&self) -> &RecalculationScheduler {
        &self.scheduler
    }

    /// Called when the bar becomes visible.
    pub fn on_activate(&self) -> u64 {
        self.scheduler.request_refresh()
    }

    /// Draws one frame. Never waits on a recalculation.
    pub fn draw(&self, canvas: &mut dyn Canvas, frame: &FrameInput) -> DrawOutcome {
        let Some(list) = self.scheduler.current() else {
            tracing::trace!(
                generation = self.scheduler.generation(),
                "segment list stale; skipping frame"
            );
            return DrawOutcome::Skipped;
        };

        let slots = layout_segments(frame.bounds, &list);
        for slot in &slots {
            let segment = &list.segments()[slot.index];
            let color = if segment.is_estimate_artifact() {
                ESTIMATE_ARTIFACT_COLOR
            } else {
                segment.color
            };
            canvas.fill_rect(slot.rect, color);
        }

        // Tooltip goes last so no segment paints over it.
        let hovered = hit_test(&slots, frame.pointer).map(|slot| slot.index);
        if let Some(index) = hovered {
            let tooltip = &list.segments()[index].tooltip;
            let placement = place_tooltip(
                frame.pointer,
                canvas.measure_text(tooltip),
                frame.parent,
                frame.screen_height,
            );
            canvas.fill_rect(placement.background, TOOLTIP_BACKGROUND);
            canvas.draw_text(tooltip, placement.text_origin, TOOLTIP_TEXT, TOOLTIP_BORDER);
        }

        DrawOutcome::Drawn {
            segments: slots.len(),
            hovered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ARTIFACT_MIN_WIDTH;
    use membar_core::aggregate::ESTIMATE_CAVEAT;
    use membar_core::color::{NON_COMPONENT_COLOR, REMAINING_COLOR};
    use membar_core::{
        AggregateOptions, PlatformMemory, StaticUsageSource, UsageBreakdown, UsageSnapshot,
    };
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    const MB: i64 = 1024 * 1024;

    #[derive(Debug, PartialEq)]
    enum Op {
        Fill(Rect, Rgba8),
        Text(String, IVec2),
    }

    #[derive(Default)]
    struct RecordingCanvas {
        ops: Vec<Op>,
    }

    impl Canvas for RecordingCanvas {
        fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
            self.ops.push(Op::Fill(rect, color));
        }

        fn measure_text(&self, text: &str) -> IVec2 {
            let lines = text.lines().count() as i32;
            let widest = text.lines().map(str::len).max().unwrap_or(0) as i32;
            IVec2::new(widest * 8, lines * 16)
        }

        fn draw_text(&mut self, text: &str, origin: IVec2, _color: Rgba8, _border: Rgba8) {
            self.ops.push(Op::Text(text.to_string(), origin));
        }
    }

    fn bar() -> MemoryBar {
        bar_for(UsageSnapshot::new(
            [("A", UsageBreakdown::new(2 * MB)), ("B", UsageBreakdown::new(MB))],
            4 * MB,
            PlatformMemory { ceiling: 16 * MB, available: 16 * MB },
        ))
    }

    fn bar_for(snapshot: UsageSnapshot) -> MemoryBar {
        let scheduler = RecalculationScheduler::new(
            Arc::new(StaticUsageSource::new(snapshot)),
            AggregateOptions::default(),
        );
        MemoryBar::new(scheduler)
    }

    fn frame(pointer: IVec2) -> FrameInput {
        FrameInput {
            bounds: Rect::new(0, 0, 1000, 20),
            pointer,
            parent: Rect::new(0, 0, 1200, 800),
            screen_height: 800,
        }
    }

    fn activate_and_wait(bar: &MemoryBar) {
        bar.on_activate();
        let deadline = Instant::now() + Duration::from_secs(5);
        while bar.scheduler().current().is_none() {
            assert!(Instant::now() < deadline, "bar never became fresh");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_skips_while_stale() {
        let bar = bar();
        let mut canvas = RecordingCanvas::default();
        assert_eq!(bar.draw(&mut canvas, &frame(IVec2::new(10, 10))), DrawOutcome::Skipped);
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn test_draws_segments_without_hover() {
        let bar = bar();
        activate_and_wait(&bar);

        let mut canvas = RecordingCanvas::default();
        let outcome = bar.draw(&mut canvas, &frame(IVec2::new(-5, -5)));
        assert_eq!(outcome, DrawOutcome::Drawn { segments: 4, hovered: None });
        assert_eq!(canvas.ops.len(), 4);
        assert_eq!(canvas.ops[2], Op::Fill(Rect::new(187, 0, 62, 20), NON_COMPONENT_COLOR));
        assert_eq!(canvas.ops[3], Op::Fill(Rect::new(249, 0, 751, 20), REMAINING_COLOR));
    }

    #[test]
    fn test_hover_draws_tooltip_last() {
        let bar = bar();
        activate_and_wait(&bar);

        let mut canvas = RecordingCanvas::default();
        let pointer = IVec2::new(130, 10);
        let outcome = bar.draw(&mut canvas, &frame(pointer));
        assert_eq!(outcome, DrawOutcome::Drawn { segments: 4, hovered: Some(1) });

        assert_eq!(canvas.ops.len(), 6);
        assert!(matches!(canvas.ops[4], Op::Fill(_, TOOLTIP_BACKGROUND)));
        assert_eq!(
            canvas.ops[5],
            Op::Text("B\nEstimate last load RAM usage: 1.0 MB".to_string(), IVec2::new(146, 26))
        );
    }

    #[test]
    fn test_negative_segment_is_drawn_distinctly_and_hoverable() {
        // Component estimate (6 MB) exceeds measured resident memory (4 MB).
        let bar = bar_for(UsageSnapshot::new(
            [("big", UsageBreakdown::new(6 * MB))],
            4 * MB,
            PlatformMemory { ceiling: 16 * MB, available: 16 * MB },
        ));
        activate_and_wait(&bar);

        let mut canvas = RecordingCanvas::default();
        let outcome = bar.draw(&mut canvas, &frame(IVec2::new(376, 10)));
        assert_eq!(outcome, DrawOutcome::Drawn { segments: 3, hovered: Some(1) });
        assert_eq!(
            canvas.ops[1],
            Op::Fill(Rect::new(375, 0, ARTIFACT_MIN_WIDTH, 20), ESTIMATE_ARTIFACT_COLOR)
        );
        assert_eq!(canvas.ops[2], Op::Fill(Rect::new(379, 0, 621, 20), REMAINING_COLOR));
        match canvas.ops.last() {
            Some(Op::Text(text, _)) => {
                assert!(text.starts_with("Host + misc: -2.0 MB"));
                assert!(text.ends_with(ESTIMATE_CAVEAT));
            }
            other => panic!("expected tooltip text, got {other:?}"),
        }
    }

    #[test]
    fn test_bounds_use_configured_height() {
        let bar = bar().with_height(32);
        assert_eq!(bar.bounds_in(Rect::new(10, 40, 600, 400)), Rect::new(10, 40, 600, 32));
        assert_eq!(MemoryBar::new(bar.scheduler().clone()).height(), DEFAULT_BAR_HEIGHT);
    }
}
