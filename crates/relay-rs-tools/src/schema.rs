//! Declarative argument schemas for tool descriptors.

use serde_json::{Map, Value, json};
use std::fmt;

/// Primitive kind a field value may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON string.
    String,
    /// Any JSON number.
    Number,
    /// JSON number without a fractional part.
    Integer,
    /// JSON boolean.
    Boolean,
    /// JSON array whose entries are all strings.
    StringArray,
    /// JSON object.
    Object,
}

impl FieldKind {
    /// Whether a raw value has this kind.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => is_integral(value),
            Self::Boolean => value.is_boolean(),
            Self::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            Self::Object => value.is_object(),
        }
    }

    /// Whether numeric bounds apply to this kind.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }

    /// JSON schema fragment for this kind.
    fn json_schema(self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Number => json!({ "type": "number" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
            Self::Object => json!({ "type": "object" }),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::StringArray => "array of strings",
            Self::Object => "object",
        };
        f.write_str(label)
    }
}

/// Specification of a single argument field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Argument name as seen by callers.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Accepted kinds; more than one makes the field a union.
    pub kinds: Vec<FieldKind>,
    /// Whether the field must be present.
    pub required: bool,
    /// Allowed literal values, if restricted.
    pub allowed: Option<Vec<Value>>,
    /// Inclusive lower bound for numeric values.
    pub minimum: Option<f64>,
    /// Inclusive upper bound for numeric values.
    pub maximum: Option<f64>,
    /// Value used when the field is absent.
    pub default: Option<Value>,
}

impl FieldSpec {
    /// Create an optional field accepting the given kinds.
    pub fn new(name: impl Into<String>, description: impl Into<String>, kinds: &[FieldKind]) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kinds: kinds.to_vec(),
            required: false,
            allowed: None,
            minimum: None,
            maximum: None,
            default: None,
        }
    }

    /// Optional string field.
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, &[FieldKind::String])
    }

    /// Optional number field.
    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, &[FieldKind::Number])
    }

    /// Optional integer field.
    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, &[FieldKind::Integer])
    }

    /// Optional boolean field.
    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, &[FieldKind::Boolean])
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict the field to a set of string literals.
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|value| json!(value)).collect());
        self
    }

    /// Set an inclusive lower bound.
    pub fn min(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Set an inclusive upper bound.
    pub fn max(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Set inclusive lower and upper bounds.
    pub fn range(self, minimum: f64, maximum: f64) -> Self {
        self.min(minimum).max(maximum)
    }

    /// Set the default applied when the field is absent.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Describe what the field accepts, for error messages.
    pub fn expectation(&self) -> String {
        let mut expected = self
            .kinds
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        if let Some(allowed) = &self.allowed {
            let values = allowed
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            expected = format!("{expected} one of [{values}]");
        }
        match (self.minimum, self.maximum) {
            (Some(min), Some(max)) => {
                expected = format!("{expected} between {} and {}", fmt_bound(min), fmt_bound(max));
            }
            (Some(min), None) => {
                expected = format!("{expected} >= {}", fmt_bound(min));
            }
            (None, Some(max)) => {
                expected = format!("{expected} <= {}", fmt_bound(max));
            }
            (None, None) => {}
        }
        expected
    }

    /// Render this field as a JSON schema property.
    fn json_schema(&self) -> Value {
        let mut property = match self.kinds.as_slice() {
            [single] => single.json_schema(),
            kinds => json!({ "oneOf": kinds.iter().map(|kind| kind.json_schema()).collect::<Vec<_>>() }),
        };
        let Some(map) = property.as_object_mut() else {
            return property;
        };
        map.insert("description".to_string(), json!(self.description));
        if let Some(allowed) = &self.allowed {
            map.insert("enum".to_string(), Value::Array(allowed.clone()));
        }
        if let Some(minimum) = self.minimum {
            map.insert("minimum".to_string(), number_value(minimum));
        }
        if let Some(maximum) = self.maximum {
            map.insert("maximum".to_string(), number_value(maximum));
        }
        if let Some(default) = &self.default {
            map.insert("default".to_string(), default.clone());
        }
        property
    }
}

/// Ordered set of argument fields for one tool.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Build a schema from fields in declaration order.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Render the schema as a JSON schema object.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(field.name.clone(), field.json_schema());
        }
        let required = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| json!(field.name))
            .collect::<Vec<_>>();
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }
}

/// Whether a JSON value is a number with no fractional part.
pub(crate) fn is_integral(value: &Value) -> bool {
    if value.is_i64() || value.is_u64() {
        return true;
    }
    value
        .as_f64()
        .is_some_and(|number| number.is_finite() && number.fract() == 0.0)
}

/// Format a bound without a trailing `.0` for whole numbers.
fn fmt_bound(bound: f64) -> String {
    number_value(bound).to_string()
}

/// Convert a bound to the most natural JSON number.
fn number_value(bound: f64) -> Value {
    if bound.fract() == 0.0 && bound.abs() < i64::MAX as f64 {
        json!(bound as i64)
    } else {
        json!(bound)
    }
}
