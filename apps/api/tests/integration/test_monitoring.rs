use super::helpers::{
    expect_status, get_request, post_json, read_json, route_entry, send, spawn_app,
};
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::atomic::Ordering;
use tokio::task::JoinSet;

#[tokio::test]
async fn missing_field_is_rejected_before_the_handler() {
    let app = spawn_app();

    let res = send(&app.app, post_json("/update_status", json!({ "active": true }))).await;
    let body: Value = read_json(expect_status(res, StatusCode::BAD_REQUEST).await).await;

    assert_eq!(body["error"], "Missing required parameter: account_id");
    assert_eq!(app.handler_calls.load(Ordering::SeqCst), 0);

    let entry = route_entry(&app.app, "/update_status").await;
    assert_eq!(entry["hits"], 1);
    assert_eq!(entry["errors"], 1);
    assert_eq!(entry["monitor_status"], "unhealthy");
    assert_eq!(entry["last_error"], "Missing required parameter: account_id");
}

#[tokio::test]
async fn null_and_mistyped_fields_are_rejected() {
    let app = spawn_app();

    let res = send(
        &app.app,
        post_json("/update_status", json!({ "account_id": null, "active": true })),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::BAD_REQUEST).await).await;
    assert_eq!(body["error"], "Parameter account_id cannot be null");

    let res = send(
        &app.app,
        post_json("/update_status", json!({ "account_id": 12, "active": "maybe" })),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::BAD_REQUEST).await).await;
    assert_eq!(body["error"], "Parameter active must be a boolean");

    assert_eq!(app.handler_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn form_bodies_are_validated() {
    let app = spawn_app();

    let req = Request::builder()
        .method("POST")
        .uri("/update_status")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("account_id=abc&active=true"))
        .expect("failed to build request");
    let res = send(&app.app, req).await;
    let body: Value = read_json(expect_status(res, StatusCode::BAD_REQUEST).await).await;

    assert_eq!(body["error"], "Parameter account_id must be an integer");
    assert_eq!(app.handler_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn valid_request_reaches_the_handler_with_its_body() {
    let app = spawn_app();

    let res = send(
        &app.app,
        post_json("/update_status", json!({ "account_id": "42", "active": 1 })),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;

    assert_eq!(body["updated"], "42");
    assert_eq!(app.handler_calls.load(Ordering::SeqCst), 1);

    let entry = route_entry(&app.app, "/update_status").await;
    assert_eq!(entry["hits"], 1);
    assert_eq!(entry["errors"], 0);
    assert_eq!(entry["monitor_status"], "healthy");
    assert_eq!(entry["status"], "healthy");
}

#[tokio::test]
async fn error_rate_above_threshold_degrades_the_route() {
    let app = spawn_app();

    for i in 0..20 {
        let uri = if i % 10 == 0 { "/outcome?fail=true" } else { "/outcome" };
        send(&app.app, get_request(uri)).await;
    }

    let entry = route_entry(&app.app, "/outcome").await;
    assert_eq!(entry["hits"], 20);
    assert_eq!(entry["errors"], 2);
    assert_eq!(entry["error_rate"], "10.00%");
    assert_eq!(entry["status"], "degraded");
    assert_eq!(entry["last_error"], "HTTP 500");
    assert!(entry["avg_response_time"].as_str().is_some_and(|s| s.ends_with('s')));
}

#[tokio::test]
async fn unmatched_requests_are_counted_under_not_found() {
    let app = spawn_app();

    let res = send(&app.app, get_request("/no/such/route")).await;
    let body: Value = read_json(expect_status(res, StatusCode::NOT_FOUND).await).await;
    assert_eq!(body["error"], "Resource not found");

    let entry = route_entry(&app.app, "not_found").await;
    assert_eq!(entry["hits"], 1);
    assert_eq!(entry["errors"], 1);
    assert_eq!(entry["description"], "404 Not Found handler");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_are_all_counted() {
    for k in [10usize, 100, 1000] {
        let app = spawn_app();
        let mut tasks = JoinSet::new();
        for _ in 0..k {
            let router = app.app.clone();
            tasks.spawn(async move { send(&router, get_request("/outcome")).await.status() });
        }
        while let Some(status) = tasks.join_next().await {
            assert_eq!(status.expect("task panicked"), StatusCode::OK);
        }

        let stats = app.state.monitoring.stats().get("/outcome");
        assert_eq!(stats.hits, k as u64, "hits for k = {}", k);
        assert_eq!(stats.errors, 0);
        assert!(stats.observed_min() <= stats.observed_max());
    }
}

#[tokio::test]
async fn reset_zeroes_stats_but_keeps_registrations() {
    let app = spawn_app();
    for _ in 0..5 {
        send(&app.app, get_request("/outcome?fail=true")).await;
    }

    let res = send(
        &app.app,
        Request::builder()
            .method("POST")
            .uri("/health/routes/reset")
            .body(Body::empty())
            .expect("failed to build request"),
    )
    .await;
    let body: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(body["reset"], 9);

    let entry = route_entry(&app.app, "/outcome").await;
    assert_eq!(entry["hits"], 0);
    assert_eq!(entry["errors"], 0);
    assert_eq!(entry["error_rate"], "0.00%");
    assert!(entry["min_response_time"].is_null());
    assert_eq!(entry["description"], "Succeeds or fails on demand");

    // Resetting again is a no-op on already-zeroed routes.
    assert_eq!(app.state.monitoring.reset_stats(), 9);
    assert_eq!(app.state.monitoring.stats().get("/outcome").hits, 0);
}
