//! Application health, route report and live status documents.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use super::config::MonitorConfig;
use super::probe::DependencyProbe;
use super::{MonitoringRegistry, format};
use crate::domain::monitoring::health::{
    ApplicationService, DatabaseService, LiveServices, RouteTotals,
};
use crate::domain::monitoring::{
    ApplicationHealth, DependencyHealth, LiveStatus, OperationStats, RouteDescriptor, RouteHealth,
    RouteReport, RouteReportEntry, RouteStatus, ServiceStatus,
};

/// Composes dependency probes, uptime and route statistics into health documents.
///
/// Every method returns a well-formed document; dependency failures show up as
/// `error`/`unhealthy` values, never as errors to the caller.
pub struct HealthAggregator {
    registry: Arc<MonitoringRegistry>,
    probe: DependencyProbe,
    config: MonitorConfig,
}

impl HealthAggregator {
    pub fn new(registry: Arc<MonitoringRegistry>, probe: DependencyProbe, config: MonitorConfig) -> Self {
        Self {
            registry,
            probe,
            config,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub async fn dependency_health(&self, force: bool) -> DependencyHealth {
        self.probe.check(force).await
    }

    /// Re-probes the database after a request failed with a server error.
    /// At most one probe runs per `failure_recheck_interval`.
    pub async fn recheck_after_failure(&self) -> DependencyHealth {
        self.probe.recheck(self.config.failure_recheck_interval).await
    }

    #[instrument(skip(self))]
    pub async fn application_health(&self) -> ApplicationHealth {
        let database = self.probe.check(false).await;
        self.application_from(&database)
    }

    fn application_from(&self, database: &DependencyHealth) -> ApplicationHealth {
        ApplicationHealth {
            status: database.status.into(),
            uptime: format::uptime(self.registry.uptime()),
            database_status: database.status,
        }
    }

    /// Per-route statistics with the error-rate derived status.
    pub fn route_report(&self) -> RouteReport {
        let stats = self.registry.stats().snapshot_all();
        let descriptors = self.registry.routes().descriptors();

        let names: BTreeSet<&str> = stats
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(descriptors.iter().map(|route| route.name.as_str()))
            .collect();

        let routes = names
            .into_iter()
            .map(|name| {
                let snapshot = stats
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, s)| *s)
                    .unwrap_or_default();
                let descriptor = descriptors.iter().find(|route| route.name == name);
                self.report_entry(name, &snapshot, descriptor)
            })
            .collect();

        RouteReport { routes }
    }

    fn report_entry(
        &self,
        name: &str,
        stats: &OperationStats,
        descriptor: Option<&RouteDescriptor>,
    ) -> RouteReportEntry {
        let error_rate = stats.error_rate();
        let status = if self.config.is_error_rate_degraded(error_rate) {
            RouteHealth::Degraded
        } else {
            RouteHealth::Healthy
        };

        RouteReportEntry {
            endpoint: name.to_string(),
            description: descriptor
                .map(|route| route.description.clone())
                .unwrap_or_default(),
            hits: stats.hits,
            errors: stats.errors,
            error_rate: format::percent(error_rate),
            avg_response_time: format::seconds(stats.avg_latency()),
            min_response_time: stats.observed_min().map(format::seconds),
            max_response_time: stats.observed_max().map(format::seconds),
            last_access: stats.last_access,
            last_error: descriptor.and_then(|route| route.last_error.clone()),
            last_check: descriptor.and_then(|route| route.last_check),
            monitor_status: descriptor
                .map(|route| route.status)
                .unwrap_or(RouteStatus::Healthy),
            status,
        }
    }

    #[instrument(skip(self))]
    pub async fn live_status(&self) -> LiveStatus {
        let database = self.probe.check(false).await;
        let application = self.application_from(&database);
        let report = self.route_report();

        let status = if database.is_healthy() && application.status == ServiceStatus::Healthy {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        };

        LiveStatus {
            status,
            timestamp: Utc::now(),
            services: LiveServices {
                database: DatabaseService {
                    status: database.status,
                    latency_ms: database.latency_ms,
                },
                application: ApplicationService {
                    status: application.status,
                    uptime: application.uptime,
                },
                routes: RouteTotals {
                    total: report.routes.len(),
                    healthy: report.healthy_count(),
                },
            },
        }
    }
}
