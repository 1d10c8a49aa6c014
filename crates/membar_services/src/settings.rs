//! Settings management

use membar_core::format::MAX_DECIMAL_PLACES;
use membar_core::{AggregateOptions, DEFAULT_DECIMAL_PLACES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("setting '{field}' is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Memory bar settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub display: DisplaySettings,
    pub tracking: TrackingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub decimal_places: u32,
    pub bar_height: u32,
    /// Label for host memory not attributed to any component.
    pub host_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    /// Registry entry belonging to the host itself.
    pub host_component_id: String,
    /// Dedicated recalculation threads; `None` uses the shared pool.
    pub worker_threads: Option<usize>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            decimal_places: DEFAULT_DECIMAL_PLACES,
            bar_height: 20,
            host_label: "Host".to_string(),
        }
    }
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            host_component_id: "host".to_string(),
            worker_threads: None,
        }
    }
}

impl Settings {
    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Loads `path` if given, otherwise returns defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.display.decimal_places > MAX_DECIMAL_PLACES {
            return Err(SettingsError::Invalid {
                field: "display.decimal_places",
                reason: format!("must be at most {MAX_DECIMAL_PLACES}"),
            });
        }
        if self.display.bar_height == 0 {
            return Err(SettingsError::Invalid {
                field: "display.bar_height",
                reason: "must be positive".to_string(),
            });
        }
        if self.tracking.worker_threads == Some(0) {
            return Err(SettingsError::Invalid {
                field: "tracking.worker_threads",
                reason: "must be positive when set".to_string(),
            });
        }
        Ok(())
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            host_component_id: self.tracking.host_component_id.clone(),
            host_label: self.display.host_label.clone(),
            decimal_places: self.display.decimal_places,
        }
    }
}
