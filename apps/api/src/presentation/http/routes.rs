use super::{
    errors::AppError,
    handlers::health,
    middleware::route_monitor::{NOT_FOUND_ROUTE, route_monitor_middleware},
    state::AppState,
};
use crate::domain::monitoring::ParamSchema;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

const HEALTH_ROUTES: &[(&str, &str)] = &[
    ("/health", "Application health"),
    ("/health/database", "Database health"),
    ("/health/routes", "Per-route statistics"),
    ("/health/routes/reset", "Reset route statistics"),
    ("/health/recommendations", "Operational recommendations"),
    ("/health/live", "Live status"),
    (NOT_FOUND_ROUTE, "404 Not Found handler"),
];

pub fn create_router(state: AppState) -> Router {
    create_router_with(state, Router::new())
}

/// Builds the router with `operations` merged next to the health surface.
///
/// Every route, the 404 fallback included, passes through the monitoring
/// middleware. Routes in `operations` should be registered on
/// `state.monitoring` under their path pattern to declare required parameters.
pub fn create_router_with(state: AppState, operations: Router<AppState>) -> Router {
    for (name, description) in HEALTH_ROUTES {
        state
            .monitoring
            .register(name, description, ParamSchema::new());
    }

    let health_routes = Router::new()
        .route("/health", get(health::application_health))
        .route("/health/database", get(health::database_health))
        .route("/health/routes", get(health::route_report))
        .route("/health/routes/reset", post(health::reset_route_stats))
        .route("/health/recommendations", get(health::recommendations))
        .route("/health/live", get(health::live_status));

    Router::new()
        .merge(health_routes)
        .merge(operations)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            route_monitor_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("No route matches the request".into())
}
