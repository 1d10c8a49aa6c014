//! Membar Services Layer
//!
//! Configuration for the memory bar and its recalculation pipeline.

pub mod settings;

pub use settings::{DisplaySettings, Settings, SettingsError, TrackingSettings};
