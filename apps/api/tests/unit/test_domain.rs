use desk_api::{
    domain::monitoring::{MonitorError, ParamSchema, ParamType, ValidationFailure},
    infrastructure::monitoring::{
        MonitoringRegistry, OperationRequest, ParameterValidator, Params, StatRecorder,
    },
};
use serde_json::json;
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

fn params(value: serde_json::Value) -> Params {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn validator_reports_first_failing_field_in_name_order() {
    let schema = ParamSchema::new()
        .require("POST", "zip", ParamType::String)
        .require("POST", "amount", ParamType::Float);

    let failure = ParameterValidator::validate("POST", &schema, &params(json!({}))).unwrap_err();

    assert_eq!(failure.field(), "amount");
    assert_eq!(failure.to_string(), "Missing required parameter: amount");
}

#[test]
fn validator_only_checks_the_request_method() {
    let schema = ParamSchema::new().require("POST", "account_id", ParamType::Integer);

    assert!(ParameterValidator::validate("GET", &schema, &params(json!({}))).is_ok());
    assert!(ParameterValidator::validate("post", &schema, &params(json!({}))).is_err());
}

#[test]
fn validator_rejects_blank_strings_as_null() {
    let schema = ParamSchema::new().require("POST", "email", ParamType::String);

    let failure =
        ParameterValidator::validate("POST", &schema, &params(json!({ "email": "   " })))
            .unwrap_err();

    assert_eq!(
        failure,
        ValidationFailure::NullField {
            field: "email".into()
        }
    );
}

#[test]
fn validator_coerces_string_forms() {
    let schema = ParamSchema::new()
        .require("POST", "count", ParamType::Integer)
        .require("POST", "ratio", ParamType::Float)
        .require("POST", "enabled", ParamType::Boolean);

    let ok = params(json!({ "count": " 12 ", "ratio": "0.5", "enabled": "TRUE" }));
    assert!(ParameterValidator::validate("POST", &schema, &ok).is_ok());

    let bad = params(json!({ "count": 1.5, "ratio": "0.5", "enabled": true }));
    let failure = ParameterValidator::validate("POST", &schema, &bad).unwrap_err();
    assert_eq!(failure.to_string(), "Parameter count must be an integer");
}

#[test]
fn n_successes_keep_latency_bounds_ordered() {
    let recorder = StatRecorder::new();
    let latencies = [5u64, 1, 9, 3, 7];

    for ms in latencies {
        recorder.record_success("/clients", Duration::from_millis(ms));
    }

    let stats = recorder.get("/clients");
    assert_eq!(stats.hits, latencies.len() as u64);
    assert_eq!(stats.errors, 0);
    let min = stats.observed_min().unwrap();
    let max = stats.observed_max().unwrap();
    assert_eq!(min, Duration::from_millis(1));
    assert_eq!(max, Duration::from_millis(9));
    assert!(min <= stats.avg_latency() && stats.avg_latency() <= max);
}

#[test]
fn reset_is_idempotent() {
    let registry = MonitoringRegistry::new();
    registry.stats().record_error("/delete_account", Duration::from_millis(3));

    registry.reset_stats();
    let once = registry.stats().get("/delete_account");
    registry.reset_stats();
    let twice = registry.stats().get("/delete_account");

    assert_eq!(once, twice);
    assert_eq!(twice.hits, 0);
    assert_eq!(twice.error_rate(), 0.0);
    assert!(twice.observed_min().is_none());
}

#[tokio::test]
async fn wrapped_operation_never_runs_on_missing_field() {
    let registry = MonitoringRegistry::new();
    registry.register(
        "add_account",
        "Create an account",
        ParamSchema::new().require("POST", "name", ParamType::String),
    );
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let add_account = registry.wrap("add_account", move |_request: OperationRequest| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(())
        }
    });

    let result = add_account(OperationRequest::new("POST", Params::new())).await;
    assert!(matches!(result, Err(MonitorError::Validation(_))));

    let result = add_account(OperationRequest::new("POST", params(json!({ "name": "Acme" })))).await;
    assert!(result.is_ok());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let stats = registry.stats().get("add_account");
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.errors, 1);
}
