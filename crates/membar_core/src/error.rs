use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while turning a byte count into display text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("{bytes} bytes needs unit index {magnitude}, past the largest suffix '{largest}'")]
    MagnitudeOverflow {
        bytes: u128,
        magnitude: usize,
        largest: &'static str,
    },
}

/// Errors a [`UsageSnapshotSource`](crate::usage::UsageSnapshotSource) can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("host cannot report {figure}")]
    Unavailable { figure: &'static str },

    #[error("snapshot source failed: {0}")]
    Source(String),
}

/// Errors raised while loading per-component estimates.
#[derive(Debug, Error)]
pub enum EstimatesError {
    #[error("failed to read estimates from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid estimates document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised while constructing a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to build recalculation thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
