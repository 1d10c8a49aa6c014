//! Membar Core
//!
//! The memory accounting engine behind the memory bar:
//! - Byte count formatting
//! - Usage snapshots and the sources that capture them
//! - Aggregation into ordered, colored segments
//! - Non-blocking background recalculation

pub mod aggregate;
pub mod color;
pub mod error;
pub mod format;
pub mod registry;
pub mod scheduler;
pub mod source;
pub mod usage;

pub use aggregate::{aggregate, AggregateOptions, Segment, SegmentKind, SegmentList};
pub use color::Rgba8;
pub use error::{EstimatesError, FormatError, SchedulerError, SnapshotError};
pub use format::{format_size, format_size_lossy, DEFAULT_DECIMAL_PLACES};
pub use registry::{ComponentEstimate, UsageRegistry};
pub use scheduler::RecalculationScheduler;
pub use source::{StaticUsageSource, SystemUsageSource};
pub use usage::{PlatformMemory, UsageBreakdown, UsageSnapshot, UsageSnapshotSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
