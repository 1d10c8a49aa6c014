//! Proportional segment layout

use crate::geometry::Rect;
use glam::IVec2;
use membar_core::SegmentList;

/// Screen rectangle assigned to the segment at `index`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SegmentSlot {
    pub index: usize,
    pub rect: Rect,
}

/// Width given to a negative (estimate artifact) segment so it stays
/// visible and hoverable.
pub const ARTIFACT_MIN_WIDTH: i32 = 4;

/// Lays segments out left to right inside `bounds`.
pub fn layout_segments(bounds: Rect, list: &SegmentList) -> Vec<SegmentSlot> {
    layout_values(bounds, list.iter().map(|segment| segment.value), list.denominator())
}

/// Each width is `floor(bounds.width * value / denominator)`, clamped to the
/// space still free. Negative values get [`ARTIFACT_MIN_WIDTH`] instead. The
/// last slot takes whatever is left, which makes the widths sum to
/// `bounds.width` exactly.
pub fn layout_values<I>(bounds: Rect, values: I, denominator: i64) -> Vec<SegmentSlot>
where
    I: IntoIterator<Item = i64>,
    I::IntoIter: ExactSizeIterator,
{
    let values = values.into_iter();
    let count = values.len();
    if bounds.is_empty() || denominator <= 0 || count == 0 {
        return Vec::new();
    }

    let mut slots = Vec::with_capacity(count);
    let mut offset = 0;
    for (index, value) in values.enumerate() {
        let free = bounds.width - offset;
        let width = if index == count - 1 {
            free
        } else if value < 0 {
            ARTIFACT_MIN_WIDTH.min(free)
        } else {
            proportional_width(bounds.width, value, denominator).clamp(0, free)
        };
        slots.push(SegmentSlot {
            index,
            rect: Rect::new(bounds.x + offset, bounds.y, width, bounds.height),
        });
        offset += width;
    }
    slots
}

fn proportional_width(total: i32, value: i64, denominator: i64) -> i32 {
    let width = (i128::from(total) * i128::from(value)).div_euclid(i128::from(denominator));
    width.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32
}

/// First slot under `pointer`.
pub fn hit_test(slots: &[SegmentSlot], pointer: IVec2) -> Option<SegmentSlot> {
    slots.iter().copied().find(|slot| slot.rect.contains(pointer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MB: i64 = 1024 * 1024;

    fn widths(slots: &[SegmentSlot]) -> Vec<i32> {
        slots.iter().map(|slot| slot.rect.width).collect()
    }

    #[test]
    fn test_scenario_widths() {
        let bounds = Rect::new(100, 50, 1000, 20);
        let slots = layout_values(bounds, [2 * MB, MB, MB, 12 * MB], 16 * MB);
        assert_eq!(widths(&slots), vec![125, 62, 62, 751]);
        assert_eq!(slots[0].rect.x, 100);
        assert_eq!(slots[1].rect.x, 225);
        assert_eq!(slots[3].rect.right(), bounds.right());
        assert!(slots.iter().all(|slot| slot.rect.y == 50 && slot.rect.height == 20));
    }

    #[test]
    fn test_segments_need_not_sum_to_denominator() {
        let slots = layout_values(Rect::new(0, 0, 100, 10), [10, 10], 100);
        assert_eq!(widths(&slots), vec![10, 90]);
    }

    #[test]
    fn test_negative_values_stay_hoverable() {
        let slots = layout_values(Rect::new(0, 0, 100, 10), [50, -20, 30], 100);
        assert_eq!(widths(&slots), vec![50, ARTIFACT_MIN_WIDTH, 100 - 50 - ARTIFACT_MIN_WIDTH]);
        assert_eq!(hit_test(&slots, IVec2::new(51, 5)).map(|s| s.index), Some(1));

        // No free space left: the artifact cannot push past the right edge.
        let slots = layout_values(Rect::new(0, 0, 100, 10), [100, -20, 30], 100);
        assert_eq!(widths(&slots), vec![100, 0, 0]);
    }

    #[test]
    fn test_overshoot_is_clamped_to_bounds() {
        let slots = layout_values(Rect::new(0, 0, 100, 10), [80, 80, 80], 100);
        assert_eq!(widths(&slots), vec![80, 20, 0]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(layout_values(Rect::new(0, 0, 0, 10), [1], 1).is_empty());
        assert!(layout_values(Rect::new(0, 0, 10, 10), [1], 0).is_empty());
        assert!(layout_values(Rect::new(0, 0, 10, 10), Vec::<i64>::new(), 10).is_empty());
    }

    #[test]
    fn test_hit_test() {
        let slots = layout_values(Rect::new(0, 0, 100, 10), [25, 25, 50], 100);
        assert_eq!(hit_test(&slots, IVec2::new(0, 5)).map(|s| s.index), Some(0));
        assert_eq!(hit_test(&slots, IVec2::new(25, 5)).map(|s| s.index), Some(1));
        assert_eq!(hit_test(&slots, IVec2::new(99, 9)).map(|s| s.index), Some(2));
        assert_eq!(hit_test(&slots, IVec2::new(100, 5)), None);
        assert_eq!(hit_test(&slots, IVec2::new(50, 10)), None);
    }

    proptest! {
        #[test]
        fn test_widths_always_fill_the_bar(
            width in 1i32..4000,
            values in proptest::collection::vec(-(1i64 << 40)..(1i64 << 40), 1..12),
            denominator in 1i64..(1i64 << 42),
        ) {
            let bounds = Rect::new(7, 3, width, 20);
            let slots = layout_values(bounds, values.iter().copied(), denominator);
            prop_assert_eq!(slots.len(), values.len());
            prop_assert_eq!(slots.iter().map(|s| s.rect.width).sum::<i32>(), width);
            prop_assert!(slots.iter().all(|s| s.rect.width >= 0));
            for pair in slots.windows(2) {
                prop_assert_eq!(pair[0].rect.right(), pair[1].rect.x);
            }
        }
    }
}
