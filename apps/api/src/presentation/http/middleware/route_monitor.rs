use std::collections::HashMap;

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::{Form, FromRequest, MatchedPath, Query, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{HeaderMap, Method, Uri, header};
use serde_json::{Value, json};

use crate::{
    domain::monitoring::DependencyStatus,
    infrastructure::monitoring::Params,
    presentation::http::{errors::AppError, state::AppState},
};

/// Name under which requests that matched no route are recorded.
pub const NOT_FOUND_ROUTE: &str = "not_found";

const MAX_BUFFERED_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Records every request against its matched route and rejects requests
/// whose required parameters fail validation before the handler runs.
///
/// Responses with a 4xx or 5xx status count as errors. A 5xx also triggers a
/// rate-limited database re-probe, and JSON error bodies gain a `db_status`.
pub async fn route_monitor_middleware(
    State(state): State<AppState>,
    matched_path: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let name = matched_path
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| NOT_FOUND_ROUTE.to_owned());
    let monitor = state.monitoring.routes();
    let invocation = monitor.begin(&name);
    let method = request.method().as_str().to_owned();

    let request = if monitor.requires_validation(&name, &method) {
        let (parts, body) = request.into_parts();
        let bytes = match to_bytes(body, MAX_BUFFERED_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = AppError::BadRequest(format!("Unreadable request body: {}", e));
                invocation.fail(&err);
                return err.into_response();
            }
        };

        let params = extract_params(&parts.method, &parts.headers, &parts.uri, &bytes).await;
        if let Err(failure) = monitor.validate(&name, &method, &params) {
            invocation.fail(&failure);
            return AppError::from(failure).into_response();
        }

        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        invocation.fail(format_args!("HTTP {}", status.as_u16()));
    } else {
        invocation.succeed();
    }

    if !status.is_server_error() {
        return response;
    }

    let database = state.health.recheck_after_failure().await;
    if !database.is_healthy() {
        tracing::warn!(route = %name, error = ?database.error, "Server error with database unavailable");
    }
    with_db_status(response, database.status).await
}

/// Adds `db_status` to a JSON object error body; other bodies pass through.
async fn with_db_status(response: Response, db_status: DependencyStatus) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if !is_json {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_BUFFERED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to buffer error body");
            parts.headers.remove(header::CONTENT_LENGTH);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut map)) => {
            map.insert("db_status".to_string(), json!(db_status));
            parts.headers.remove(header::CONTENT_LENGTH);
            Body::from(Value::Object(map).to_string())
        }
        _ => Body::from(bytes),
    };
    Response::from_parts(parts, body)
}

/// Parameters by content negotiation: JSON body, then form body, then query string.
async fn extract_params(method: &Method, headers: &HeaderMap, uri: &Uri, body: &Bytes) -> Params {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        return match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map,
            _ => Params::new(),
        };
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let form_request = http::Request::builder()
            .method(method.clone())
            .uri(uri.clone())
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.clone()));
        if let Ok(form_request) = form_request {
            if let Ok(Form(fields)) =
                Form::<HashMap<String, String>>::from_request(form_request, &()).await
            {
                return to_params(fields);
            }
        }
        return Params::new();
    }

    Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(fields)| to_params(fields))
        .unwrap_or_default()
}

fn to_params(fields: HashMap<String, String>) -> Params {
    fields
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}
