use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;

use crate::domain::monitoring::OperationStats;

/// Per-operation counters shared by every request task.
///
/// Each entry is updated under its shard lock, so a reader always sees a
/// snapshot taken between two complete updates.
#[derive(Debug, Default)]
pub struct StatRecorder {
    stats: DashMap<String, OperationStats>,
}

impl StatRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, name: &str, latency: Duration) {
        self.record(name, latency, false);
    }

    pub fn record_error(&self, name: &str, latency: Duration) {
        self.record(name, latency, true);
    }

    fn record(&self, name: &str, latency: Duration, failed: bool) {
        let now = Utc::now();
        if let Some(mut stats) = self.stats.get_mut(name) {
            stats.record(latency, failed, now);
            return;
        }
        self.stats
            .entry(name.to_string())
            .or_default()
            .record(latency, failed, now);
    }

    /// Creates a zeroed entry if `name` has never been seen.
    pub fn ensure(&self, name: &str) {
        if !self.stats.contains_key(name) {
            self.stats.entry(name.to_string()).or_default();
        }
    }

    /// Snapshot for `name`; the zero state when nothing was recorded yet.
    pub fn get(&self, name: &str) -> OperationStats {
        self.stats
            .get(name)
            .map(|stats| *stats)
            .unwrap_or_default()
    }

    pub fn reset(&self, name: &str) {
        self.stats.insert(name.to_string(), OperationStats::default());
    }

    /// Zeroes every known operation and returns how many were reset.
    pub fn reset_all(&self) -> usize {
        let mut count = 0;
        for mut entry in self.stats.iter_mut() {
            *entry.value_mut() = OperationStats::default();
            count += 1;
        }
        count
    }

    /// All operations ordered by name.
    pub fn snapshot_all(&self) -> Vec<(String, OperationStats)> {
        let mut all: Vec<_> = self
            .stats
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}
