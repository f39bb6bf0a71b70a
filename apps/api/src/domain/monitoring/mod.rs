//! Monitoring domain: per-route statistics, route registrations, dependency
//! health snapshots and the reports built from them.

pub mod errors;
pub mod health;
pub mod recommendation;
pub mod route;
pub mod stats;

pub use errors::{MonitorError, ProbeError, ValidationFailure};
pub use health::{
    ApplicationHealth, DependencyHealth, DependencyStatus, IndexInfo, LiveStatus, RouteHealth,
    RouteReport, RouteReportEntry, ServiceStatus, TableInventory,
};
pub use recommendation::{Priority, Recommendation, RecommendationKind};
pub use route::{ParamSchema, ParamType, RouteDescriptor, RouteStatus};
pub use stats::OperationStats;
