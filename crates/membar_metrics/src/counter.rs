//! Named counters for tracking events

use dashmap::DashMap;

/// Thread-safe event counters keyed by name.
#[derive(Debug)]
pub struct Counter {
    counters: DashMap<String, u64>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
        }
    }

    pub fn increment(&self, name: &str, value: u64) {
        *self.counters.entry(name.to_string()).or_insert(0) += value;
    }

    pub fn set(&self, name: &str, value: u64) {
        self.counters.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).map(|v| *v).unwrap_or(0)
    }

    pub fn reset(&self, name: &str) {
        self.counters.insert(name.to_string(), 0);
    }

    pub fn reset_all(&self) {
        self.counters.clear();
    }

    /// Copies all counters out, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let mut out: Vec<_> = self
            .counters
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        out.sort();
        out
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}
