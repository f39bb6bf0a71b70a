use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::monitoring::{ParamSchema, ParamType, ValidationFailure};

/// Request parameters after content negotiation, keyed by field name.
pub type Params = Map<String, Value>;

const BOOLEAN_LITERALS: [&str; 4] = ["true", "false", "0", "1"];

/// Checks incoming parameters against a route's declared schema.
pub struct ParameterValidator;

impl ParameterValidator {
    /// Returns the first failing field, checking fields in name order.
    ///
    /// Methods the schema does not mention always pass.
    pub fn validate(
        method: &str,
        schema: &ParamSchema,
        params: &Params,
    ) -> Result<(), ValidationFailure> {
        let Some(fields) = schema.fields_for(method) else {
            return Ok(());
        };

        for (field, expected) in fields {
            let Some(value) = params.get(field) else {
                debug!(field = %field, method = %method, "required parameter missing");
                return Err(ValidationFailure::MissingField {
                    field: field.clone(),
                });
            };

            if is_null(value) {
                return Err(ValidationFailure::NullField {
                    field: field.clone(),
                });
            }

            if !conforms(value, *expected) {
                return Err(ValidationFailure::TypeMismatch {
                    field: field.clone(),
                    expected: *expected,
                });
            }
        }

        Ok(())
    }
}

fn is_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn conforms(value: &Value, expected: ParamType) -> bool {
    match expected {
        ParamType::Integer => match value {
            Value::Number(n) => n.is_i64() || n.is_u64(),
            Value::String(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        },
        ParamType::Float => match value {
            Value::Number(_) => true,
            Value::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
            _ => false,
        },
        ParamType::Boolean => match value {
            Value::Bool(_) => true,
            Value::Number(n) => matches!(n.as_u64(), Some(0 | 1)),
            Value::String(s) => {
                let lowered = s.trim().to_ascii_lowercase();
                BOOLEAN_LITERALS.contains(&lowered.as_str())
            }
            _ => false,
        },
        ParamType::String | ParamType::Any => true,
    }
}
