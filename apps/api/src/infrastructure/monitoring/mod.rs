//! Route monitoring and health aggregation.
//!
//! This module provides:
//! - Per-route hit, error and latency statistics
//! - Required-parameter validation ahead of handlers
//! - A cached, time-bounded liveness probe for the database
//! - Health, route and live-status documents plus operational recommendations
//!
//! All state lives in a single [`MonitoringRegistry`] built at startup and
//! shared by handle; nothing here is a process-wide global.

pub mod config;
pub mod format;
pub mod health;
pub mod probe;
pub mod recommendations;
pub mod route_monitor;
pub mod stat_recorder;
pub mod validator;

pub use config::MonitorConfig;
pub use health::HealthAggregator;
pub use probe::{DependencyProbe, ProbeTransport};
pub use recommendations::RecommendationEngine;
pub use route_monitor::{Invocation, OperationRequest, RouteMonitor};
pub use stat_recorder::StatRecorder;
pub use validator::{ParameterValidator, Params};

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;

use crate::domain::monitoring::{MonitorError, ParamSchema};

/// Owner of route registrations and statistics for the whole process.
#[derive(Debug)]
pub struct MonitoringRegistry {
    stats: Arc<StatRecorder>,
    routes: Arc<RouteMonitor>,
    started_at: Instant,
}

impl MonitoringRegistry {
    pub fn new() -> Self {
        let stats = Arc::new(StatRecorder::new());
        let routes = Arc::new(RouteMonitor::new(Arc::clone(&stats)));
        Self {
            stats,
            routes,
            started_at: Instant::now(),
        }
    }

    pub fn stats(&self) -> &Arc<StatRecorder> {
        &self.stats
    }

    pub fn routes(&self) -> &Arc<RouteMonitor> {
        &self.routes
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn register(&self, name: &str, description: &str, schema: ParamSchema) {
        self.routes.register(name, description, schema);
    }

    /// See [`RouteMonitor::wrap`].
    pub fn wrap<F, Fut, T, E>(
        &self,
        name: &str,
        handler: F,
    ) -> impl Fn(OperationRequest) -> BoxFuture<'static, Result<T, MonitorError<E>>>
    + Clone
    + Send
    + Sync
    + use<F, Fut, T, E>
    where
        F: Fn(OperationRequest) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        self.routes.wrap(name, handler)
    }

    /// Zeroes every route's statistics; registrations are kept.
    pub fn reset_stats(&self) -> usize {
        let count = self.stats.reset_all();
        tracing::info!(routes = count, "Route statistics reset");
        count
    }
}

impl Default for MonitoringRegistry {
    fn default() -> Self {
        Self::new()
    }
}
