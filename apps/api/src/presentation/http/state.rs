use crate::{
    config::Config,
    infrastructure::monitoring::{
        DependencyProbe, HealthAggregator, MonitorConfig, MonitoringRegistry, ProbeTransport,
        RecommendationEngine,
    },
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub monitoring: Arc<MonitoringRegistry>,
    pub health: Arc<HealthAggregator>,
    pub recommendations: Arc<RecommendationEngine>,
}

impl AppState {
    /// Wires the monitoring registry and health subsystem around `transport`.
    pub fn new(config: Config, transport: Arc<dyn ProbeTransport>) -> Self {
        let monitor_config = MonitorConfig::from(&config);
        let monitoring = Arc::new(MonitoringRegistry::new());
        let probe = DependencyProbe::new(
            transport,
            monitor_config.probe_cache_ttl,
            monitor_config.probe_timeout,
        );
        let health = Arc::new(HealthAggregator::new(
            Arc::clone(&monitoring),
            probe,
            monitor_config.clone(),
        ));

        Self {
            config,
            monitoring,
            health,
            recommendations: Arc::new(RecommendationEngine::new(monitor_config)),
        }
    }
}
