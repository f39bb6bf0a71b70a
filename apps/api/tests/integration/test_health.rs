use super::helpers::{
    build_config, expect_status, get_request, read_json, send, spawn_app, spawn_app_with,
};
use axum::http::{StatusCode, header};
use serde_json::Value;

const HEALTH_ENDPOINTS: &[&str] = &[
    "/health",
    "/health/database",
    "/health/routes",
    "/health/recommendations",
    "/health/live",
];

#[tokio::test]
async fn health_endpoints_answer_200_while_database_is_down() {
    let app = spawn_app();
    app.transport.set_down(true);

    for uri in HEALTH_ENDPOINTS {
        let res = expect_status(send(&app.app, get_request(uri)).await, StatusCode::OK).await;
        let _: Value = read_json(res).await;
    }

    let res = send(&app.app, get_request("/health")).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database_status"], "error");
    assert!(body["uptime"].as_str().is_some_and(|u| u.contains(':')));
}

#[tokio::test]
async fn database_failure_then_recovery_through_force() {
    let app = spawn_app();
    app.transport.set_down(true);

    let res = send(&app.app, get_request("/health/database")).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["status"], "error");
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|e| e.contains("connection refused"))
    );
    assert!(body.get("tables").is_none());

    app.transport.set_down(false);

    // Still within the TTL: the failure is served from cache.
    let res = send(&app.app, get_request("/health/database")).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["status"], "error");

    let res = send(&app.app, get_request("/health/database?force=true")).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["latency_ms"].is_u64());
    assert_eq!(body["tables"]["client_accounts"]["row_count"], 2_500_000);

    let res = send(&app.app, get_request("/health")).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database_status"], "healthy");
}

#[tokio::test]
async fn probe_result_is_cached_until_forced() {
    let app = spawn_app();

    for _ in 0..3 {
        expect_status(send(&app.app, get_request("/health")).await, StatusCode::OK).await;
    }
    assert_eq!(app.transport.ping_count(), 1);

    expect_status(
        send(&app.app, get_request("/health/database?force=true")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(app.transport.ping_count(), 2);
}

#[tokio::test]
async fn live_status_reports_every_service() {
    let app = spawn_app();

    let res = send(&app.app, get_request("/health/live")).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;

    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
    assert_eq!(body["services"]["database"]["status"], "healthy");
    assert_eq!(body["services"]["application"]["status"], "healthy");
    // Six health routes, the 404 handler and two operations.
    assert_eq!(body["services"]["routes"]["total"], 9);
    assert_eq!(body["services"]["routes"]["healthy"], 9);
}

#[tokio::test]
async fn live_status_is_unhealthy_when_database_is_down() {
    let app = spawn_app();
    app.transport.set_down(true);

    let res = send(&app.app, get_request("/health/live")).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;

    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["services"]["database"]["status"], "error");
    assert!(body["services"]["database"]["latency_ms"].is_null());
    assert_eq!(body["services"]["application"]["status"], "unhealthy");
}

#[tokio::test]
async fn recommendations_cover_inventory_and_route_errors() {
    let app = spawn_app();

    for i in 0..20 {
        let uri = if i < 2 { "/outcome?fail=true" } else { "/outcome" };
        send(&app.app, get_request(uri)).await;
    }

    let res = send(&app.app, get_request("/health/recommendations")).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    let items = body["recommendations"]
        .as_array()
        .expect("recommendations should be an array");

    let summary: Vec<(&str, &str, &str)> = items
        .iter()
        .map(|item| {
            (
                item["type"].as_str().unwrap_or_default(),
                item["priority"].as_str().unwrap_or_default(),
                item["message"].as_str().unwrap_or_default(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            (
                "index",
                "high",
                "Add index on client_accounts.client_id for better query performance"
            ),
            ("reliability", "high", "High error rate (10.0%) on route /outcome"),
            (
                "performance",
                "medium",
                "Consider archiving old data from client_accounts (2,500,000 rows)"
            ),
        ]
    );
}

#[tokio::test]
async fn recommendations_skip_inventory_rules_when_database_is_down() {
    let app = spawn_app();
    app.transport.set_down(true);

    let res = send(&app.app, get_request("/health/recommendations")).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;

    assert_eq!(body["recommendations"], serde_json::json!([]));
}

#[tokio::test]
async fn server_error_refreshes_cached_database_health() {
    let app = spawn_app();

    let res = send(&app.app, get_request("/health")).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(app.transport.ping_count(), 1);

    app.transport.set_down(true);

    let res = expect_status(
        send(&app.app, get_request("/clients")).await,
        StatusCode::SERVICE_UNAVAILABLE,
    )
    .await;
    assert_eq!(res.headers().get(header::RETRY_AFTER).unwrap(), "60");
    let body: Value = read_json(res).await;
    assert_eq!(body["error"], "External service unavailable");
    assert_eq!(body["retry_after"], 60);
    assert_eq!(body["db_status"], "error");

    let res = send(&app.app, get_request("/health")).await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database_status"], "error");
    assert_eq!(app.transport.ping_count(), 2);
}

#[tokio::test]
async fn server_error_recheck_is_rate_limited() {
    let mut config = build_config();
    config.health_failure_recheck_seconds = 300;
    let app = spawn_app_with(config);

    expect_status(send(&app.app, get_request("/health")).await, StatusCode::OK).await;
    app.transport.set_down(true);

    for _ in 0..5 {
        expect_status(
            send(&app.app, get_request("/clients")).await,
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .await;
    }

    assert_eq!(app.transport.ping_count(), 1);
}
