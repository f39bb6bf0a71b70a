use crate::{
    domain::monitoring::{
        ApplicationHealth, DependencyHealth, LiveStatus, Recommendation, RouteReport,
    },
    presentation::http::state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct DatabaseHealthQuery {
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    recommendations: Vec<Recommendation>,
}

#[derive(Serialize)]
pub struct ResetResponse {
    reset: usize,
}

/// GET /health
pub async fn application_health(State(state): State<AppState>) -> Json<ApplicationHealth> {
    Json(state.health.application_health().await)
}

/// GET /health/database?force=true
pub async fn database_health(
    State(state): State<AppState>,
    Query(query): Query<DatabaseHealthQuery>,
) -> Json<DependencyHealth> {
    let health = state.health.dependency_health(query.force).await;
    if !health.is_healthy() {
        tracing::warn!(error = ?health.error, "Database reported unhealthy");
    }
    Json(health)
}

/// GET /health/routes
pub async fn route_report(State(state): State<AppState>) -> Json<RouteReport> {
    Json(state.health.route_report())
}

/// POST /health/routes/reset
pub async fn reset_route_stats(State(state): State<AppState>) -> Json<ResetResponse> {
    Json(ResetResponse {
        reset: state.monitoring.reset_stats(),
    })
}

/// GET /health/recommendations
pub async fn recommendations(State(state): State<AppState>) -> Json<RecommendationsResponse> {
    let recommendations = state
        .recommendations
        .recommendations(&state.health, &state.monitoring)
        .await;
    Json(RecommendationsResponse { recommendations })
}

/// GET /health/live
pub async fn live_status(State(state): State<AppState>) -> Json<LiveStatus> {
    Json(state.health.live_status().await)
}
