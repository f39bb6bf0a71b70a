use tracing::instrument;

use super::config::MonitorConfig;
use super::format;
use super::health::HealthAggregator;
use super::MonitoringRegistry;
use crate::domain::monitoring::{
    DependencyHealth, OperationStats, Priority, Recommendation, RecommendationKind,
};

/// Derives operational advice from dependency inventory and route error rates.
pub struct RecommendationEngine {
    config: MonitorConfig,
}

impl RecommendationEngine {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Current recommendations, highest priority first.
    #[instrument(skip_all)]
    pub async fn recommendations(
        &self,
        health: &HealthAggregator,
        registry: &MonitoringRegistry,
    ) -> Vec<Recommendation> {
        let dependency = health.dependency_health(false).await;
        let routes = registry.stats().snapshot_all();
        self.evaluate(&dependency, &routes)
    }

    pub fn evaluate(
        &self,
        dependency: &DependencyHealth,
        routes: &[(String, OperationStats)],
    ) -> Vec<Recommendation> {
        let mut items = Vec::new();

        if let (true, Some(tables)) = (dependency.is_healthy(), dependency.tables.as_ref()) {
            for (table, inventory) in tables {
                for column in inventory.unindexed_foreign_keys() {
                    items.push(Recommendation::new(
                        RecommendationKind::Index,
                        Priority::High,
                        format!(
                            "Add index on {}.{} for better query performance",
                            table, column
                        ),
                    ));
                }

                if self.config.is_large_table(inventory.row_count) {
                    items.push(Recommendation::new(
                        RecommendationKind::Performance,
                        Priority::Medium,
                        format!(
                            "Consider archiving old data from {} ({} rows)",
                            table,
                            format::thousands(inventory.row_count)
                        ),
                    ));
                }
            }
        }

        for (name, stats) in routes {
            let error_rate = stats.error_rate();
            if self.config.is_error_rate_degraded(error_rate) {
                items.push(Recommendation::new(
                    RecommendationKind::Reliability,
                    Priority::High,
                    format!("High error rate ({:.1}%) on route {}", error_rate, name),
                ));
            }
        }

        // Stable: equal priorities keep rule order.
        items.sort_by_key(|item| item.priority);
        items
    }
}
