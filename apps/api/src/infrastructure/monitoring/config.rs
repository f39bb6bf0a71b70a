//! Configuration for the route monitoring and health subsystem.

use std::time::Duration;

use crate::config::Config;

/// Thresholds and probe limits used by the health aggregator and recommendations
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Route error percentage above which a route is reported as degraded
    pub error_rate_threshold: f64,

    /// Row count above which a table is suggested for archiving
    pub large_table_row_threshold: i64,

    /// How long a dependency probe result is served from cache
    pub probe_cache_ttl: Duration,

    /// Upper bound on a single probe round-trip
    pub probe_timeout: Duration,

    /// Minimum gap between re-probes triggered by failing requests
    pub failure_recheck_interval: Duration,
}

impl MonitorConfig {
    /// Checks if an error rate (percent) crosses the degraded threshold
    pub fn is_error_rate_degraded(&self, error_rate: f64) -> bool {
        error_rate > self.error_rate_threshold
    }

    pub fn is_large_table(&self, row_count: i64) -> bool {
        row_count > self.large_table_row_threshold
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            error_rate_threshold: 5.0,
            large_table_row_threshold: 1_000_000,
            probe_cache_ttl: Duration::from_secs(300),
            probe_timeout: Duration::from_secs(5),
            failure_recheck_interval: Duration::from_secs(5),
        }
    }
}

impl From<&Config> for MonitorConfig {
    fn from(config: &Config) -> Self {
        Self {
            error_rate_threshold: config.route_error_rate_threshold,
            large_table_row_threshold: config.large_table_row_threshold,
            probe_cache_ttl: Duration::from_secs(config.health_check_cache_seconds),
            probe_timeout: Duration::from_secs(config.health_probe_timeout_seconds),
            failure_recheck_interval: Duration::from_secs(config.health_failure_recheck_seconds),
        }
    }
}
