//! Snapshot sources

use crate::error::SnapshotError;
use crate::registry::UsageRegistry;
use crate::usage::{bytes_to_i64, PlatformMemory, UsageSnapshot, UsageSnapshotSource};
use membar_env::AddressSpace;
use std::sync::Arc;

/// Captures the registry's estimates together with live OS figures.
#[derive(Debug, Clone)]
pub struct SystemUsageSource {
    registry: Arc<UsageRegistry>,
}

impl SystemUsageSource {
    pub fn new(registry: Arc<UsageRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<UsageRegistry> {
        &self.registry
    }
}

impl UsageSnapshotSource for SystemUsageSource {
    fn capture(&self) -> Result<UsageSnapshot, SnapshotError> {
        let resident = membar_env::process_resident_bytes().ok_or(SnapshotError::Unavailable {
            figure: "process resident memory",
        })?;
        let space = AddressSpace::detect().ok_or(SnapshotError::Unavailable {
            figure: "platform memory",
        })?;

        Ok(snapshot_from_registry(
            &self.registry,
            bytes_to_i64(resident),
            PlatformMemory {
                ceiling: bytes_to_i64(space.ceiling),
                available: bytes_to_i64(space.available),
            },
        ))
    }
}

/// Builds a snapshot from registry contents plus externally measured figures.
pub fn snapshot_from_registry(
    registry: &UsageRegistry,
    host_resident: i64,
    platform: PlatformMemory,
) -> UsageSnapshot {
    let components = registry.components();
    let names: Vec<(String, String)> = components
        .iter()
        .filter_map(|(id, estimate)| Some((id.clone(), estimate.display_name.clone()?)))
        .collect();

    UsageSnapshot::new(
        components.into_iter().map(|(id, estimate)| (id, estimate.usage)),
        host_resident,
        platform,
    )
    .with_display_names(names)
}

/// Always returns the same snapshot.
#[derive(Debug, Clone)]
pub struct StaticUsageSource {
    snapshot: UsageSnapshot,
}

impl StaticUsageSource {
    pub fn new(snapshot: UsageSnapshot) -> Self {
        Self { snapshot }
    }
}

impl UsageSnapshotSource for StaticUsageSource {
    fn capture(&self) -> Result<UsageSnapshot, SnapshotError> {
        Ok(self.snapshot.clone())
    }
}
