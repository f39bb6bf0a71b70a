use std::time::Duration;

use chrono::{DateTime, Utc};

/// Accumulated counters for a single operation.
///
/// `min_latency` starts at `Duration::MAX` so the first observation always replaces it;
/// use [`OperationStats::observed_min`] when reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationStats {
    pub hits: u64,
    pub errors: u64,
    pub total_latency: Duration,
    pub min_latency: Duration,
    pub max_latency: Duration,
    pub last_access: Option<DateTime<Utc>>,
}

impl Default for OperationStats {
    fn default() -> Self {
        Self {
            hits: 0,
            errors: 0,
            total_latency: Duration::ZERO,
            min_latency: Duration::MAX,
            max_latency: Duration::ZERO,
            last_access: None,
        }
    }
}

impl OperationStats {
    /// Folds one invocation into the counters. Errors count as hits too, so `errors <= hits`.
    pub fn record(&mut self, latency: Duration, failed: bool, at: DateTime<Utc>) {
        self.hits += 1;
        if failed {
            self.errors += 1;
        }
        self.total_latency = self.total_latency.saturating_add(latency);
        self.min_latency = self.min_latency.min(latency);
        self.max_latency = self.max_latency.max(latency);
        self.last_access = Some(at);
    }

    pub fn avg_latency(&self) -> Duration {
        if self.hits == 0 {
            return Duration::ZERO;
        }
        self.total_latency.div_f64(self.hits as f64)
    }

    /// Error percentage in `0.0..=100.0`.
    pub fn error_rate(&self) -> f64 {
        if self.hits == 0 {
            return 0.0;
        }
        self.errors as f64 / self.hits as f64 * 100.0
    }

    pub fn observed_min(&self) -> Option<Duration> {
        (self.hits > 0).then_some(self.min_latency)
    }

    pub fn observed_max(&self) -> Option<Duration> {
        (self.hits > 0).then_some(self.max_latency)
    }
}
