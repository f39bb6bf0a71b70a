use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primitive type a required parameter must be coercible to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Float,
    Boolean,
    String,
    /// Presence and non-null only
    Any,
}

impl ParamType {
    /// Noun phrase used in validation messages ("must be an integer").
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Integer => "an integer",
            Self::Float => "a number",
            Self::Boolean => "a boolean",
            Self::String => "a string",
            Self::Any => "a value",
        }
    }
}

/// Required parameters of a route, keyed by HTTP method.
///
/// Methods are stored upper-cased so `post` and `POST` address the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParamSchema {
    methods: BTreeMap<String, BTreeMap<String, ParamType>>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `field` as required for `method`.
    pub fn require(mut self, method: &str, field: &str, param_type: ParamType) -> Self {
        self.methods
            .entry(method.to_ascii_uppercase())
            .or_default()
            .insert(field.to_string(), param_type);
        self
    }

    pub fn fields_for(&self, method: &str) -> Option<&BTreeMap<String, ParamType>> {
        self.methods.get(&method.to_ascii_uppercase())
    }

    pub fn validates(&self, method: &str) -> bool {
        self.fields_for(method).is_some_and(|fields| !fields.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.methods.values().all(BTreeMap::is_empty)
    }
}

/// Outcome of the most recent invocation of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Healthy,
    Unhealthy,
}

/// Registration record and instantaneous health of a monitored route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteDescriptor {
    pub name: String,
    pub description: String,
    pub required_params: ParamSchema,
    pub status: RouteStatus,
    pub last_error: Option<String>,
    pub last_check: Option<DateTime<Utc>>,
}

impl RouteDescriptor {
    pub fn new(name: String, description: String, required_params: ParamSchema) -> Self {
        Self {
            name,
            description,
            required_params,
            status: RouteStatus::Healthy,
            last_error: None,
            last_check: None,
        }
    }

    /// The previous error message is kept so operators can still see what last went wrong.
    pub fn mark_healthy(&mut self, at: DateTime<Utc>) {
        self.status = RouteStatus::Healthy;
        self.last_check = Some(at);
    }

    pub fn mark_unhealthy(&mut self, error: String, at: DateTime<Utc>) {
        self.status = RouteStatus::Unhealthy;
        self.last_error = Some(error);
        self.last_check = Some(at);
    }
}
