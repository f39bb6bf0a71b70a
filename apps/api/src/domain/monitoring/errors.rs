use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use super::route::ParamType;

/// Why a request's parameters were rejected before reaching the handler.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ValidationFailure {
    #[error("Missing required parameter: {field}")]
    MissingField { field: String },

    #[error("Parameter {field} cannot be null")]
    NullField { field: String },

    #[error("Parameter {field} must be {}", .expected.describe())]
    TypeMismatch { field: String, expected: ParamType },
}

impl ValidationFailure {
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field }
            | Self::NullField { field }
            | Self::TypeMismatch { field, .. } => field,
        }
    }
}

/// Error surfaced by a monitored invocation.
///
/// The handler's own error is carried unchanged in [`MonitorError::Handler`].
#[derive(Debug, Error)]
pub enum MonitorError<E> {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("{0}")]
    Handler(E),
}

impl<E> MonitorError<E> {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn into_handler_error(self) -> Option<E> {
        match self {
            Self::Handler(err) => Some(err),
            Self::Validation(_) => None,
        }
    }
}

/// Failure of a dependency probe round-trip.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Database probe timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Inventory query failed: {0}")]
    Inventory(String),
}
