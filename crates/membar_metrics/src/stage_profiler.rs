//! Stage profiler for timing named pipeline stages

use super::ring_buffer::RingBuffer;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Keeps the most recent `capacity` durations for each named stage.
#[derive(Debug)]
pub struct StageProfiler {
    capacity: usize,
    stages: Mutex<HashMap<String, RingBuffer<Duration>>>,
}

impl StageProfiler {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            stages: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `f` and records its wall time under `name`. The lock is only
    /// taken after `f` returns.
    pub fn time_stage<F, R>(&self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.stages
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| RingBuffer::new(self.capacity))
            .push(elapsed);
        result
    }

    pub fn last(&self, name: &str) -> Duration {
        self.stages
            .lock()
            .get(name)
            .and_then(|buffer| buffer.last().copied())
            .unwrap_or(Duration::ZERO)
    }

    pub fn average(&self, name: &str) -> Duration {
        self.stages
            .lock()
            .get(name)
            .map(|buffer| buffer.average())
            .unwrap_or(Duration::ZERO)
    }

    pub fn samples(&self, name: &str) -> usize {
        self.stages.lock().get(name).map(|buffer| buffer.len()).unwrap_or(0)
    }

    pub fn reset(&self) {
        self.stages.lock().clear();
    }
}

impl Default for StageProfiler {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_each_stage_separately() {
        let profiler = StageProfiler::new(2);
        profiler.time_stage("capture", || std::thread::sleep(Duration::from_millis(2)));
        profiler.time_stage("capture", || ());
        profiler.time_stage("capture", || ());
        profiler.time_stage("aggregate", || ());

        assert_eq!(profiler.samples("capture"), 2);
        assert_eq!(profiler.samples("aggregate"), 1);
        assert_eq!(profiler.samples("missing"), 0);
        assert_eq!(profiler.average("missing"), Duration::ZERO);

        profiler.reset();
        assert_eq!(profiler.samples("capture"), 0);
    }
}
