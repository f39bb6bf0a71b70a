use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reachability of an external dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    Healthy,
    Error,
}

/// Overall status of the application or one of its services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

impl From<DependencyStatus> for ServiceStatus {
    fn from(status: DependencyStatus) -> Self {
        match status {
            DependencyStatus::Healthy => Self::Healthy,
            DependencyStatus::Error => Self::Unhealthy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub definition: String,
}

/// Lightweight description of one table, gathered during a probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInventory {
    pub row_count: i64,
    pub indexes: Vec<IndexInfo>,
    pub foreign_key_columns: Vec<String>,
}

impl TableInventory {
    /// Foreign-key columns that no index definition covers, in declaration order.
    pub fn unindexed_foreign_keys(&self) -> impl Iterator<Item = &str> {
        self.foreign_key_columns
            .iter()
            .map(String::as_str)
            .filter(|column| {
                !self
                    .indexes
                    .iter()
                    .any(|index| index_covers(&index.definition, column))
            })
    }
}

/// Whether `column` appears in the key list of an index definition such as
/// `CREATE INDEX ix ON public.t USING btree (client_id, created_at)`.
fn index_covers(definition: &str, column: &str) -> bool {
    let Some(start) = definition.find('(') else {
        return false;
    };
    definition[start..]
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|token| token.eq_ignore_ascii_case(column))
}

/// Snapshot produced by a dependency probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyHealth {
    pub status: DependencyStatus,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<BTreeMap<String, TableInventory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the store answered but the inventory could not be collected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_error: Option<String>,
}

impl DependencyHealth {
    pub fn healthy(
        latency: Duration,
        tables: Option<BTreeMap<String, TableInventory>>,
        metadata_error: Option<String>,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            status: DependencyStatus::Healthy,
            checked_at,
            latency_ms: Some(latency.as_millis() as u64),
            tables,
            error: None,
            metadata_error,
        }
    }

    pub fn failed(error: String, checked_at: DateTime<Utc>) -> Self {
        Self {
            status: DependencyStatus::Error,
            checked_at,
            latency_ms: None,
            tables: None,
            error: Some(error),
            metadata_error: None,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == DependencyStatus::Healthy
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationHealth {
    pub status: ServiceStatus,
    pub uptime: String,
    pub database_status: DependencyStatus,
}

/// Status of a route as derived from its accumulated error rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteHealth {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteReportEntry {
    pub endpoint: String,
    pub description: String,
    pub hits: u64,
    pub errors: u64,
    pub error_rate: String,
    pub avg_response_time: String,
    pub min_response_time: Option<String>,
    pub max_response_time: Option<String>,
    pub last_access: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_check: Option<DateTime<Utc>>,
    /// Outcome of the latest invocation only.
    pub monitor_status: super::route::RouteStatus,
    pub status: RouteHealth,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteReport {
    pub routes: Vec<RouteReportEntry>,
}

impl RouteReport {
    pub fn healthy_count(&self) -> usize {
        self.routes
            .iter()
            .filter(|route| route.status == RouteHealth::Healthy)
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseService {
    pub status: DependencyStatus,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationService {
    pub status: ServiceStatus,
    pub uptime: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteTotals {
    pub total: usize,
    pub healthy: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveServices {
    pub database: DatabaseService,
    pub application: ApplicationService,
    pub routes: RouteTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveStatus {
    pub status: ServiceStatus,
    pub timestamp: DateTime<Utc>,
    pub services: LiveServices,
}
