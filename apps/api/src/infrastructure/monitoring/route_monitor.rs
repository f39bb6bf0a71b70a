use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::DashMap;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::{debug, error};

use super::stat_recorder::StatRecorder;
use super::validator::{ParameterValidator, Params};
use crate::domain::monitoring::{MonitorError, ParamSchema, RouteDescriptor, ValidationFailure};

const DEFAULT_DESCRIPTION: &str = "No description";
const ABORTED: &str = "invocation aborted before completion";

/// Parameters handed to a monitored operation.
#[derive(Debug, Clone, Default)]
pub struct OperationRequest {
    pub method: String,
    pub params: Params,
}

impl OperationRequest {
    pub fn new(method: &str, params: Params) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            params,
        }
    }
}

/// Owns route registrations and turns invocation outcomes into statistics.
#[derive(Debug)]
pub struct RouteMonitor {
    routes: DashMap<String, RouteDescriptor>,
    stats: Arc<StatRecorder>,
}

impl RouteMonitor {
    pub fn new(stats: Arc<StatRecorder>) -> Self {
        Self {
            routes: DashMap::new(),
            stats,
        }
    }

    /// Registers a route. Re-registering replaces description and schema but
    /// leaves statistics and the current status alone.
    pub fn register(&self, name: &str, description: &str, schema: ParamSchema) {
        self.routes
            .entry(name.to_string())
            .and_modify(|route| {
                route.description = description.to_string();
                route.required_params = schema.clone();
            })
            .or_insert_with(|| {
                RouteDescriptor::new(name.to_string(), description.to_string(), schema)
            });
        self.stats.ensure(name);
        debug!(route = %name, "route registered");
    }

    fn ensure_registered(&self, name: &str) {
        if !self.routes.contains_key(name) {
            self.register(name, DEFAULT_DESCRIPTION, ParamSchema::new());
        }
    }

    pub fn descriptor(&self, name: &str) -> Option<RouteDescriptor> {
        self.routes.get(name).map(|route| route.value().clone())
    }

    /// All registrations ordered by name.
    pub fn descriptors(&self) -> Vec<RouteDescriptor> {
        let mut all: Vec<_> = self.routes.iter().map(|route| route.value().clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Whether requests with `method` to `name` carry required parameters.
    pub fn requires_validation(&self, name: &str, method: &str) -> bool {
        self.routes
            .get(name)
            .is_some_and(|route| route.required_params.validates(method))
    }

    pub fn validate(&self, name: &str, method: &str, params: &Params) -> Result<(), ValidationFailure> {
        match self.routes.get(name) {
            Some(route) => ParameterValidator::validate(method, &route.required_params, params),
            None => Ok(()),
        }
    }

    /// Starts timing an invocation of `name`. The returned guard must be
    /// settled with [`Invocation::succeed`] or [`Invocation::fail`]; dropping it
    /// unsettled records an error.
    pub fn begin(self: &Arc<Self>, name: &str) -> Invocation {
        self.ensure_registered(name);
        Invocation {
            monitor: Arc::clone(self),
            name: name.to_string(),
            started: Instant::now(),
            settled: false,
        }
    }

    fn record_success(&self, name: &str, latency: Duration) {
        self.stats.record_success(name, latency);
        if let Some(mut route) = self.routes.get_mut(name) {
            route.mark_healthy(Utc::now());
        }
    }

    fn record_failure(&self, name: &str, latency: Duration, message: String) {
        error!(route = %name, latency_ms = latency.as_millis() as u64, error = %message, "Route failed");
        self.stats.record_error(name, latency);
        if let Some(mut route) = self.routes.get_mut(name) {
            route.mark_unhealthy(message, Utc::now());
        }
    }

    /// Validates, runs `handler` and records the outcome. Validation failures
    /// never reach the handler; handler errors are returned unchanged.
    pub async fn invoke<F, Fut, T, E>(
        self: &Arc<Self>,
        name: &str,
        request: OperationRequest,
        handler: F,
    ) -> Result<T, MonitorError<E>>
    where
        F: FnOnce(OperationRequest) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let invocation = self.begin(name);

        if let Err(failure) = self.validate(name, &request.method, &request.params) {
            invocation.fail(&failure);
            return Err(MonitorError::Validation(failure));
        }

        match handler(request).await {
            Ok(value) => {
                invocation.succeed();
                Ok(value)
            }
            Err(err) => {
                invocation.fail(&err);
                Err(MonitorError::Handler(err))
            }
        }
    }

    /// Wraps `handler` so every call goes through [`RouteMonitor::invoke`] under `name`.
    pub fn wrap<F, Fut, T, E>(
        self: &Arc<Self>,
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
        E: Display + Send + 'static,
    {
        self.ensure_registered(name);
        let monitor = Arc::clone(self);
        let name: Arc<str> = Arc::from(name);

        move |request| {
            let monitor = Arc::clone(&monitor);
            let name = Arc::clone(&name);
            let handler = handler.clone();
            async move { monitor.invoke(&name, request, handler).await }.boxed()
        }
    }
}

/// Timing guard for one in-flight invocation.
#[derive(Debug)]
pub struct Invocation {
    monitor: Arc<RouteMonitor>,
    name: String,
    started: Instant,
    settled: bool,
}

impl Invocation {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn succeed(mut self) -> Duration {
        self.settled = true;
        let latency = self.elapsed();
        self.monitor.record_success(&self.name, latency);
        latency
    }

    pub fn fail(mut self, error: impl Display) -> Duration {
        self.settled = true;
        let latency = self.elapsed();
        self.monitor.record_failure(&self.name, latency, error.to_string());
        latency
    }
}

impl Drop for Invocation {
    fn drop(&mut self) {
        if !self.settled {
            let latency = self.elapsed();
            self.monitor.record_failure(&self.name, latency, ABORTED.to_string());
        }
    }
}
