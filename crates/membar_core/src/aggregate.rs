//! Memory aggregation
//!
//! Turns a [`UsageSnapshot`] into the ordered segment list the bar draws:
//! components by descending total, then host memory not attributed to any
//! component, then the memory still available.

use crate::color::{palette_color, Rgba8, NON_COMPONENT_COLOR, REMAINING_COLOR};
use crate::format::{format_size_lossy, DEFAULT_DECIMAL_PLACES};
use crate::usage::UsageSnapshot;

/// Tooltip line appended to segments whose derived value went negative.
pub const ESTIMATE_CAVEAT: &str = " (estimates exceed measured usage)";

/// What a segment stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Component { id: String },
    NonComponent,
    Remaining,
}

/// One colored region of the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Bytes; only derived segments can be negative.
    pub value: i64,
    pub tooltip: String,
    pub color: Rgba8,
}

impl Segment {
    /// True when the value is negative because estimates overshot a measured figure.
    pub fn is_estimate_artifact(&self) -> bool {
        self.value < 0
    }
}

/// Fully built aggregation result, published as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentList {
    segments: Vec<Segment>,
    denominator: i64,
    generation: u64,
}

impl SegmentList {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Platform available memory; widths are proportional to this, not to
    /// the sum of segment values.
    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    /// Refresh request that produced this list (0 when built directly).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

impl<'a> IntoIterator for &'a SegmentList {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Knobs for [`aggregate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOptions {
    /// The host's own entry in the registry; never shown as a component.
    pub host_component_id: String,
    /// Name used in the non-component tooltip.
    pub host_label: String,
    pub decimal_places: u32,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            host_component_id: "host".to_string(),
            host_label: "Host".to_string(),
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}

/// Builds the segment list for `snapshot`. Deterministic for a given input.
pub fn aggregate(snapshot: &UsageSnapshot, options: &AggregateOptions) -> SegmentList {
    let size = |value: i64| format_size_lossy(value, options.decimal_places);

    // Stable sort over identifier order, so equal totals stay alphabetical.
    let mut components: Vec<_> = snapshot
        .components()
        .filter(|(id, usage)| usage.total > 0 && *id != options.host_component_id)
        .collect();
    components.sort_by(|a, b| b.1.total.cmp(&a.1.total));

    let mut segments = Vec::with_capacity(components.len() + 2);
    let mut total_component_memory: i64 = 0;

    for (index, (id, usage)) in components.into_iter().enumerate() {
        total_component_memory = total_component_memory.saturating_add(usage.total);

        let mut tooltip = String::from(snapshot.display_name(id));
        tooltip.push_str(&format!("\nEstimate last load RAM usage: {}", size(usage.total)));
        for (category, value) in usage.categories() {
            if value > 0 {
                tooltip.push_str(&format!("\n {}: {}", category, size(value)));
            }
        }

        segments.push(Segment {
            kind: SegmentKind::Component { id: id.to_string() },
            value: usage.total,
            tooltip,
            color: palette_color(index),
        });
    }

    let resident = snapshot.host_resident();
    let non_component = resident.saturating_sub(total_component_memory);
    segments.push(derived_segment(
        SegmentKind::NonComponent,
        non_component,
        format!(
            "{} + misc: {}\n Total: {}",
            options.host_label,
            size(non_component),
            size(resident)
        ),
        NON_COMPONENT_COLOR,
    ));

    let available = snapshot.platform_available();
    let remaining = available.saturating_sub(resident);
    segments.push(derived_segment(
        SegmentKind::Remaining,
        remaining,
        format!("Available Memory: {}\n Total: {}", size(remaining), size(available)),
        REMAINING_COLOR,
    ));

    tracing::debug!(
        components = segments.len() - 2,
        component_bytes = total_component_memory,
        non_component,
        remaining,
        "aggregated usage snapshot"
    );

    SegmentList {
        segments,
        denominator: available,
        generation: 0,
    }
}

fn derived_segment(kind: SegmentKind, value: i64, mut tooltip: String, color: Rgba8) -> Segment {
    if value < 0 {
        tooltip.push('\n');
        tooltip.push_str(ESTIMATE_CAVEAT);
    }
    Segment {
        kind,
        value,
        tooltip,
        color,
    }
}
