//! Declarative schemas for tool parameters and tool results.
//!
//! A `Schema` is plain data: the same descriptor renders the JSON Schema sent
//! in `tools/list` and validates untrusted values at call time. Validation
//! collects every violation instead of stopping at the first one, and returns
//! a normalized object:
//!
//! - unknown keys are dropped;
//! - `null` counts as absent, except for `Any` fields where it is a value;
//! - declared defaults are filled in;
//! - integral floats become integers for `Integer` fields;
//! - `Quantity` fields accept any non-negative number and round it.

use serde::Serialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    /// Non-negative integer (counts reported by the backend).
    Integer,
    /// Non-negative number sent on as the nearest integer (limits, depths,
    /// milliseconds). Callers may pass `1500.5`; the backend sees `1501`.
    Quantity,
    Number,
    Boolean,
    /// Any JSON value, passed through untouched.
    Any,
    /// A string restricted to the listed values.
    Enum(&'static [&'static str]),
    Array(Box<FieldType>),
    Object(Schema),
}

impl FieldType {
    pub fn array_of(item: FieldType) -> Self {
        FieldType::Array(Box::new(item))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    pub description: Option<&'static str>,
    /// Filled in by the gateway when the caller leaves the field out.
    pub default: Option<Value>,
}

impl Field {
    pub fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
            description: None,
            default: None,
        }
    }

    pub fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty)
        }
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// An object schema: an ordered list of named fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

/// One rejected field. `field` is a path such as `scrapeOptions.formats[1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Every violation found in one value. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// True if some violation is reported at exactly `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate `value` and return the normalized object.
    pub fn validate(&self, value: &Value) -> Result<Map<String, Value>, ValidationError> {
        let mut violations = Vec::new();
        let normalized = self.check_object("", value, &mut violations);
        match normalized {
            Some(map) if violations.is_empty() => Ok(map),
            _ => Err(ValidationError::new(violations)),
        }
    }

    fn check_object(
        &self,
        path: &str,
        value: &Value,
        violations: &mut Vec<Violation>,
    ) -> Option<Map<String, Value>> {
        let Some(object) = value.as_object() else {
            reject(violations, path, "an object", value);
            return None;
        };

        let mut normalized = Map::new();
        for field in &self.fields {
            let field_path = join_path(path, field.name);
            let present = object
                .get(field.name)
                .filter(|v| !v.is_null() || field.ty == FieldType::Any);
            match present {
                Some(raw) => {
                    if let Some(v) = check_value(&field.ty, &field_path, raw, violations) {
                        normalized.insert(field.name.to_string(), v);
                    }
                }
                None => {
                    if let Some(default) = &field.default {
                        normalized.insert(field.name.to_string(), default.clone());
                    } else if field.required {
                        violations.push(Violation::new(field_path, "is required"));
                    }
                }
            }
        }
        Some(normalized)
    }

    /// Render as a JSON Schema object.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = type_schema(&field.ty);
            if let Some(description) = field.description {
                prop["description"] = json!(description);
            }
            if let Some(default) = &field.default {
                prop["default"] = default.clone();
            }
            properties.insert(field.name.to_string(), prop);
        }

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();

        let mut schema = json!({ "type": "object", "properties": properties });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }
}

fn check_value(
    ty: &FieldType,
    path: &str,
    value: &Value,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    match ty {
        FieldType::Any => Some(value.clone()),
        FieldType::String if value.is_string() => Some(value.clone()),
        FieldType::String => reject(violations, path, "a string", value),
        FieldType::Boolean if value.is_boolean() => Some(value.clone()),
        FieldType::Boolean => reject(violations, path, "a boolean", value),
        FieldType::Number if value.is_number() => Some(value.clone()),
        FieldType::Number => reject(violations, path, "a number", value),
        FieldType::Integer => match as_non_negative_integer(value) {
            Some(n) => Some(Value::from(n)),
            None => reject(violations, path, "a non-negative integer", value),
        },
        FieldType::Quantity => match as_rounded_quantity(value) {
            Some(n) => Some(Value::from(n)),
            None => reject(violations, path, "a non-negative number", value),
        },
        FieldType::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => Some(value.clone()),
            _ => {
                violations.push(Violation::new(
                    path,
                    format!("expected one of {}, got {value}", allowed.join(", ")),
                ));
                None
            }
        },
        FieldType::Array(item) => {
            let Some(items) = value.as_array() else {
                return reject(violations, path, "an array", value);
            };
            let before = violations.len();
            let checked: Vec<Value> = items
                .iter()
                .enumerate()
                .filter_map(|(i, v)| check_value(item, &format!("{path}[{i}]"), v, violations))
                .collect();
            (violations.len() == before).then_some(Value::Array(checked))
        }
        FieldType::Object(schema) => {
            let before = violations.len();
            let map = schema.check_object(path, value, violations)?;
            (violations.len() == before).then_some(Value::Object(map))
        }
    }
}

fn reject(
    violations: &mut Vec<Violation>,
    path: &str,
    expected: &str,
    value: &Value,
) -> Option<Value> {
    violations.push(Violation::new(
        path,
        format!("expected {expected}, got {}", kind_of(value)),
    ));
    None
}

fn as_non_negative_integer(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

fn as_rounded_quantity(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?.round();
    if f.is_finite() && f >= 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

fn type_schema(ty: &FieldType) -> Value {
    match ty {
        FieldType::String => json!({ "type": "string" }),
        FieldType::Integer => json!({ "type": "integer", "minimum": 0 }),
        FieldType::Quantity => json!({ "type": "number", "minimum": 0 }),
        FieldType::Number => json!({ "type": "number" }),
        FieldType::Boolean => json!({ "type": "boolean" }),
        FieldType::Any => json!({}),
        FieldType::Enum(values) => json!({ "type": "string", "enum": values }),
        FieldType::Array(item) => json!({ "type": "array", "items": type_schema(item) }),
        FieldType::Object(schema) => schema.to_json_schema(),
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
