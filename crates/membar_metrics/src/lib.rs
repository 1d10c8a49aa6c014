//! Membar Metrics - Instrumentation for the recalculation pipeline
//!
//! Provides counters and stage timers that completely vanish in
//! production builds via feature flags.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use membar_metrics::{Counter, StageProfiler};
//!
//! let counters = Counter::new();
//! let profiler = StageProfiler::new(16); // Keep the last 16 samples per stage
//! let snapshot = profiler.time_stage("capture", || source.capture());
//! counters.increment("refresh.published", 1);
//! ```
//!
//! Both types take `&self` so they can be shared between the render
//! thread and background workers behind an `Arc`.

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod stage_profiler;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use stage_profiler::StageProfiler;

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&self, _name: &str, _value: u64) {}
    pub fn set(&self, _name: &str, _value: u64) {}
    pub fn get(&self, _name: &str) -> u64 { 0 }
    pub fn reset(&self, _name: &str) {}
    pub fn reset_all(&self) {}
    pub fn snapshot(&self) -> Vec<(String, u64)> { Vec::new() }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct StageProfiler;

#[cfg(not(feature = "metrics"))]
impl StageProfiler {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn time_stage<F, R>(&self, _name: &str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn last(&self, _name: &str) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn average(&self, _name: &str) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn samples(&self, _name: &str) -> usize { 0 }
    pub fn reset(&self) {}
}
