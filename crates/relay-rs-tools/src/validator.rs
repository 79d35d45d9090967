//! Argument validation against a tool schema.

use crate::schema::{FieldSpec, Schema, is_integral};
use relay_rs_protocol::ToolError;
use serde_json::{Map, Value};

/// Why an argument object was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was absent.
    #[error("missing required field `{field}`")]
    MissingField {
        /// Field name.
        field: String,
    },
    /// A field had the wrong kind, an unlisted value, or was out of bounds.
    #[error("field `{field}` expected {expected}, got {actual}")]
    TypeMismatch {
        /// Field name (`arguments` for the root object).
        field: String,
        /// What the schema accepts.
        expected: String,
        /// What was received.
        actual: String,
    },
}

impl From<ValidationError> for ToolError {
    fn from(err: ValidationError) -> Self {
        ToolError::InvalidArguments(err.to_string())
    }
}

/// Arguments that passed validation, with defaults filled in.
///
/// Only fields declared in the schema are retained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidatedArguments {
    values: Map<String, Value>,
}

impl ValidatedArguments {
    /// Raw value of a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// String value of a field.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    /// String value of a field the schema marks as required.
    pub fn require_str(&self, name: &str) -> Result<&str, ToolError> {
        self.str(name)
            .ok_or_else(|| ToolError::Internal(format!("validated argument `{name}` is missing")))
    }

    /// Render a field as a query-parameter value; `None` when absent.
    ///
    /// Whole numbers render without a fractional part and string arrays are
    /// comma-joined.
    pub fn param(&self, name: &str) -> Option<String> {
        self.values.get(name).and_then(render_param)
    }
}

/// Validate raw arguments against a schema.
///
/// Fields are checked in declaration order and the first failure is
/// reported. `null` arguments are treated as an empty object and a `null`
/// field value is treated as absent.
pub fn validate(schema: &Schema, raw: &Value) -> Result<ValidatedArguments, ValidationError> {
    let empty = Map::new();
    let supplied = match raw {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(ValidationError::TypeMismatch {
                field: "arguments".to_string(),
                expected: "object".to_string(),
                actual: describe_kind(other).to_string(),
            });
        }
    };

    let mut values = Map::new();
    for field in schema.fields() {
        match supplied.get(&field.name).filter(|value| !value.is_null()) {
            Some(value) => {
                check_field(field, value)?;
                values.insert(field.name.clone(), value.clone());
            }
            None => {
                if let Some(default) = &field.default {
                    values.insert(field.name.clone(), default.clone());
                } else if field.required {
                    return Err(ValidationError::MissingField {
                        field: field.name.clone(),
                    });
                }
            }
        }
    }
    Ok(ValidatedArguments { values })
}

/// Check one present value against its field spec.
fn check_field(field: &FieldSpec, value: &Value) -> Result<(), ValidationError> {
    let Some(kind) = field.kinds.iter().find(|kind| kind.matches(value)) else {
        return Err(mismatch(field, describe_kind(value).to_string()));
    };

    if let Some(allowed) = &field.allowed
        && !allowed.contains(value)
    {
        return Err(mismatch(field, value.to_string()));
    }

    if kind.is_numeric()
        && let Some(number) = value.as_f64()
    {
        let below = field.minimum.is_some_and(|min| number < min);
        let above = field.maximum.is_some_and(|max| number > max);
        if below || above {
            return Err(mismatch(field, value.to_string()));
        }
    }
    Ok(())
}

fn mismatch(field: &FieldSpec, actual: String) -> ValidationError {
    ValidationError::TypeMismatch {
        field: field.name.clone(),
        expected: field.expectation(),
        actual,
    }
}

/// Short JSON type name used in mismatch messages.
fn describe_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render a validated value for use in a query string.
fn render_param(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => {
            if is_integral(value)
                && let Some(whole) = number.as_f64()
                && !number.is_i64()
                && !number.is_u64()
            {
                return Some(format!("{whole:.0}"));
            }
            Some(number.to_string())
        }
        Value::Array(items) => {
            let parts = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>();
            Some(parts.join(","))
        }
        Value::Null | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{ValidationError, validate};
    use crate::schema::{FieldKind, FieldSpec, Schema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn eod_schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new(
                "symbols",
                "Stock symbol(s)",
                &[FieldKind::String, FieldKind::StringArray],
            )
            .required(),
            FieldSpec::string("interval", "Interval").one_of(&["1min", "5min", "1hour"]),
            FieldSpec::integer("limit", "Page size")
                .range(1.0, 1000.0)
                .default_value(json!(100)),
            FieldSpec::integer("offset", "Offset").min(0.0),
        ])
    }

    #[test]
    fn missing_required_field_is_reported() {
        let err = validate(&eod_schema(), &json!({ "limit": 5 })).expect_err("missing");
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "symbols".to_string()
            }
        );
        assert_eq!(err.to_string(), "missing required field `symbols`");
    }

    #[test]
    fn null_arguments_behave_like_empty_object() {
        let err = validate(&eod_schema(), &serde_json::Value::Null).expect_err("missing");
        assert!(matches!(err, ValidationError::MissingField { .. }));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let err = validate(&eod_schema(), &json!(["AAPL"])).expect_err("array");
        assert_eq!(
            err.to_string(),
            "field `arguments` expected object, got array"
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        let schema = eod_schema();
        validate(&schema, &json!({ "symbols": "AAPL", "limit": 1 })).expect("lower bound");
        validate(&schema, &json!({ "symbols": "AAPL", "limit": 1000 })).expect("upper bound");

        let err = validate(&schema, &json!({ "symbols": "AAPL", "limit": 0 })).expect_err("zero");
        assert_eq!(
            err.to_string(),
            "field `limit` expected integer between 1 and 1000, got 0"
        );
        let err =
            validate(&schema, &json!({ "symbols": "AAPL", "limit": 1001 })).expect_err("too big");
        assert!(matches!(err, ValidationError::TypeMismatch { field, .. } if field == "limit"));
    }

    #[test]
    fn enumeration_membership_is_checked() {
        let err = validate(&eod_schema(), &json!({ "symbols": "AAPL", "interval": "2min" }))
            .expect_err("bad interval");
        let ValidationError::TypeMismatch { field, actual, .. } = err else {
            panic!("expected type mismatch");
        };
        assert_eq!(field, "interval");
        assert_eq!(actual, "\"2min\"");
    }

    #[test]
    fn union_accepts_either_kind() {
        let schema = eod_schema();
        validate(&schema, &json!({ "symbols": "AAPL" })).expect("string");
        validate(&schema, &json!({ "symbols": ["AAPL", "MSFT"] })).expect("array");
        let err = validate(&schema, &json!({ "symbols": [1, 2] })).expect_err("numbers");
        assert_eq!(
            err.to_string(),
            "field `symbols` expected string or array of strings, got array"
        );
    }

    #[test]
    fn defaults_fill_and_unknown_fields_drop() {
        let validated = validate(
            &eod_schema(),
            &json!({ "symbols": "AAPL", "unexpected": true, "offset": null }),
        )
        .expect("valid");
        assert_eq!(validated.get("limit"), Some(&json!(100)));
        assert_eq!(validated.get("unexpected"), None);
        assert_eq!(validated.get("offset"), None);
    }

    #[test]
    fn first_failing_field_wins() {
        let err = validate(
            &eod_schema(),
            &json!({ "symbols": 5, "interval": "2min", "limit": 0 }),
        )
        .expect_err("invalid");
        assert!(matches!(err, ValidationError::TypeMismatch { field, .. } if field == "symbols"));
    }

    #[test]
    fn params_render_for_query_strings() {
        let validated = validate(
            &eod_schema(),
            &json!({ "symbols": ["AAPL", "MSFT"], "limit": 250.0 }),
        )
        .expect("valid");
        assert_eq!(validated.param("symbols"), Some("AAPL,MSFT".to_string()));
        assert_eq!(validated.param("limit"), Some("250".to_string()));
        assert_eq!(validated.param("offset"), None);
    }
}
