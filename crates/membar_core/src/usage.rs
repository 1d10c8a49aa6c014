//! Usage snapshot data model

use crate::error::SnapshotError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Estimated memory footprint of one component, in bytes.
///
/// Category fields are each at most `total` but need not sum to it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageBreakdown {
    pub total: i64,
    pub managed: i64,
    pub code: i64,
    pub sounds: i64,
    pub textures: i64,
}

impl UsageBreakdown {
    pub fn new(total: i64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Category name/value pairs in display order.
    pub fn categories(&self) -> [(&'static str, i64); 4] {
        [
            ("Managed", self.managed),
            ("Code", self.code),
            ("Sounds", self.sounds),
            ("Textures", self.textures),
        ]
    }
}

/// Platform memory limits at capture time, in bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PlatformMemory {
    pub ceiling: i64,
    pub available: i64,
}

/// Memory measurements captured at one point in time.
///
/// Snapshots are never mutated after capture; a refresh builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSnapshot {
    components: BTreeMap<String, UsageBreakdown>,
    display_names: BTreeMap<String, String>,
    host_resident: i64,
    platform: PlatformMemory,
}

impl UsageSnapshot {
    pub fn new<I, K>(components: I, host_resident: i64, platform: PlatformMemory) -> Self
    where
        I: IntoIterator<Item = (K, UsageBreakdown)>,
        K: Into<String>,
    {
        Self {
            components: components
                .into_iter()
                .map(|(id, usage)| (id.into(), usage))
                .collect(),
            display_names: BTreeMap::new(),
            host_resident,
            platform,
        }
    }

    pub fn with_display_names<I, K, V>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.display_names
            .extend(names.into_iter().map(|(id, name)| (id.into(), name.into())));
        self
    }

    /// Components in identifier order.
    pub fn components(&self) -> impl Iterator<Item = (&str, &UsageBreakdown)> {
        self.components.iter().map(|(id, usage)| (id.as_str(), usage))
    }

    pub fn component(&self, id: &str) -> Option<&UsageBreakdown> {
        self.components.get(id)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Display name for `id`, or `id` itself when none was recorded.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.display_names.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn host_resident(&self) -> i64 {
        self.host_resident
    }

    pub fn platform_ceiling(&self) -> i64 {
        self.platform.ceiling
    }

    pub fn platform_available(&self) -> i64 {
        self.platform.available
    }
}

/// Supplies usage snapshots on demand. Called from background workers.
pub trait UsageSnapshotSource: Send + Sync {
    fn capture(&self) -> Result<UsageSnapshot, SnapshotError>;
}

impl<F> UsageSnapshotSource for F
where
    F: Fn() -> Result<UsageSnapshot, SnapshotError> + Send + Sync,
{
    fn capture(&self) -> Result<UsageSnapshot, SnapshotError> {
        self()
    }
}

/// Saturating conversion for OS figures reported as unsigned.
pub(crate) fn bytes_to_i64(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_id() {
        let platform = PlatformMemory { ceiling: 100, available: 80 };
        let components = [("a", UsageBreakdown::new(1)), ("b", UsageBreakdown::new(2))];
        let snapshot =
            UsageSnapshot::new(components, 10, platform).with_display_names([("a", "Alpha")]);

        assert_eq!(snapshot.display_name("a"), "Alpha");
        assert_eq!(snapshot.display_name("b"), "b");
        assert_eq!(snapshot.component_count(), 2);
        assert_eq!(snapshot.component("b").map(|u| u.total), Some(2));
        assert_eq!(snapshot.platform_available(), 80);
    }

    #[test]
    fn test_breakdown_deserializes_partial_documents() {
        let usage: UsageBreakdown =
            serde_json::from_str(r#"{ "total": 10, "textures": 4 }"#).unwrap();
        assert_eq!(usage, UsageBreakdown { total: 10, textures: 4, ..UsageBreakdown::default() });
    }

    #[test]
    fn test_bytes_saturate() {
        assert_eq!(bytes_to_i64(12), 12);
        assert_eq!(bytes_to_i64(u64::MAX), i64::MAX);
    }
}
