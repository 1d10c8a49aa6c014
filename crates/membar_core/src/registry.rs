//! Per-component usage estimates recorded by the host

use crate::error::EstimatesError;
use crate::usage::UsageBreakdown;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One recorded estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub usage: UsageBreakdown,
}

/// Concurrent table of component estimates.
///
/// Loaders write into it while components load; snapshot sources copy it
/// out from background workers.
#[derive(Debug, Default)]
pub struct UsageRegistry {
    entries: DashMap<String, ComponentEstimate>,
}

impl UsageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `{ "<id>": { "display_name": .., "total": .., .. } }`.
    pub fn from_json_str(text: &str) -> Result<Self, EstimatesError> {
        let parsed: BTreeMap<String, ComponentEstimate> = serde_json::from_str(text)?;
        let registry = Self::new();
        for (id, estimate) in parsed {
            registry.entries.insert(id, estimate);
        }
        Ok(registry)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, EstimatesError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EstimatesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Records or replaces the estimate for `id`.
    pub fn record(
        &self,
        id: impl Into<String>,
        display_name: Option<String>,
        usage: UsageBreakdown,
    ) {
        let id = id.into();
        tracing::trace!(component = %id, total = usage.total, "recording usage estimate");
        self.entries.insert(id, ComponentEstimate { display_name, usage });
    }

    pub fn remove(&self, id: &str) -> Option<ComponentEstimate> {
        self.entries.remove(id).map(|(_, estimate)| estimate)
    }

    pub fn get(&self, id: &str) -> Option<ComponentEstimate> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies the table out in identifier order.
    pub fn components(&self) -> BTreeMap<String, ComponentEstimate> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_replace_remove() {
        let registry = UsageRegistry::new();
        registry.record("a", None, UsageBreakdown::new(5));
        registry.record("a", Some("Alpha".into()), UsageBreakdown::new(7));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("a"),
            Some(ComponentEstimate {
                display_name: Some("Alpha".into()),
                usage: UsageBreakdown::new(7),
            })
        );

        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_json() {
        let registry = UsageRegistry::from_json_str(
            r#"{
                "calamity": { "display_name": "Calamity", "total": 2097152, "textures": 1048576 },
                "tiny": { "total": 4 }
            }"#,
        )
        .unwrap();

        let components = registry.components();
        assert_eq!(components.keys().collect::<Vec<_>>(), ["calamity", "tiny"]);
        assert_eq!(components["calamity"].display_name.as_deref(), Some("Calamity"));
        assert_eq!(components["calamity"].usage.textures, 1_048_576);
        assert_eq!(components["tiny"].usage.total, 4);
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let err = UsageRegistry::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, EstimatesError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = UsageRegistry::load_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, EstimatesError::Io { .. }));
    }
}
