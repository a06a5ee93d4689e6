//! Schema diagnostics for scripted calls and writes.
//!
//! A [`Schema`] answers one question: does a value conform, and if not, where
//! and why. [`diagnose`] returns the list of [`Issue`]s (empty means pass);
//! [`validate`] folds them into a [`ConstraintError`] with a summary line.
//!
//! Two strategies are supported:
//! - structural shapes (`Tuple`, `Record`) matched element-wise, with
//!   `Literal` leaves compared by deep equality;
//! - typed checks (`Type`, `Json`, `Custom`) that produce their own messages.

mod json;
mod value_type;

pub use json::JsonSchema;
pub use value_type::ValueType;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Number, Value};
use thiserror::Error;
use understudy_types::{ConstraintError, Issue, IssuePath};

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("Invalid JSON Schema: {message}")]
    InvalidJsonSchema { message: String },
}

/// A user-supplied validator.
///
/// Issue paths are relative to the value handed in; the caller relocates them.
pub trait Diagnose {
    fn diagnose(&self, value: &Value) -> Vec<Issue>;
}

/// Requirement a value must satisfy.
#[derive(Clone)]
pub enum Schema {
    /// Accepts every value.
    Any,
    /// Deep equality with the given value.
    Literal(Value),
    /// JSON type check.
    Type(ValueType),
    /// An array matched element-wise; missing elements are `null`, extra
    /// elements are not checked.
    Tuple(Vec<Schema>),
    /// An object matched field-wise; missing fields are `null`, extra fields
    /// are not checked.
    Record(BTreeMap<String, Schema>),
    Json(JsonSchema),
    Custom(Arc<dyn Diagnose + Send + Sync>),
}

impl Schema {
    /// Whole-value deep equality.
    pub fn literal(value: impl Into<Value>) -> Self {
        Schema::Literal(value.into())
    }

    /// Structural schema mirroring `value`: arrays become tuples, objects
    /// become records, everything else is a literal.
    #[must_use]
    pub fn shape(value: Value) -> Self {
        match value {
            Value::Array(items) => Schema::Tuple(items.into_iter().map(Schema::shape).collect()),
            Value::Object(fields) => Schema::Record(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Schema::shape(value)))
                    .collect(),
            ),
            other => Schema::Literal(other),
        }
    }

    pub fn json(document: Value) -> Result<Self, SchemaError> {
        JsonSchema::compile(document).map(Schema::Json)
    }

    /// Validator built from a predicate; `Err(message)` becomes a root issue.
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        Schema::Custom(Arc::new(Predicate(check)))
    }

    #[must_use]
    pub fn null() -> Self {
        Schema::Type(ValueType::Null)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Schema::Type(ValueType::Boolean)
    }

    #[must_use]
    pub fn number() -> Self {
        Schema::Type(ValueType::Number)
    }

    #[must_use]
    pub fn integer() -> Self {
        Schema::Type(ValueType::Integer)
    }

    #[must_use]
    pub fn string() -> Self {
        Schema::Type(ValueType::String)
    }

    #[must_use]
    pub fn array() -> Self {
        Schema::Type(ValueType::Array)
    }

    #[must_use]
    pub fn object() -> Self {
        Schema::Type(ValueType::Object)
    }
}

impl From<Value> for Schema {
    fn from(value: Value) -> Self {
        Schema::shape(value)
    }
}

impl From<ValueType> for Schema {
    fn from(value_type: ValueType) -> Self {
        Schema::Type(value_type)
    }
}

impl From<JsonSchema> for Schema {
    fn from(schema: JsonSchema) -> Self {
        Schema::Json(schema)
    }
}

impl Diagnose for Schema {
    fn diagnose(&self, value: &Value) -> Vec<Issue> {
        diagnose(self, value, &IssuePath::root())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Any => f.write_str("Any"),
            Schema::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Schema::Type(value_type) => f.debug_tuple("Type").field(value_type).finish(),
            Schema::Tuple(items) => f.debug_tuple("Tuple").field(items).finish(),
            Schema::Record(fields) => f.debug_tuple("Record").field(fields).finish(),
            Schema::Json(schema) => fmt::Debug::fmt(schema, f),
            Schema::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

struct Predicate<F>(F);

impl<F> Diagnose for Predicate<F>
where
    F: Fn(&Value) -> Result<(), String>,
{
    fn diagnose(&self, value: &Value) -> Vec<Issue> {
        match (self.0)(value) {
            Ok(()) => Vec::new(),
            Err(message) => vec![Issue::new(IssuePath::root(), message)],
        }
    }
}

/// Every way `value` fails `schema`, located under `path`.
#[must_use]
pub fn diagnose(schema: &Schema, value: &Value, path: &IssuePath) -> Vec<Issue> {
    match schema {
        Schema::Any => Vec::new(),
        Schema::Literal(expected) => {
            if literal_eq(expected, value) {
                Vec::new()
            } else {
                vec![Issue::new(
                    path.clone(),
                    format!("Expecting {expected}, got {value}"),
                )]
            }
        }
        Schema::Type(value_type) => {
            if value_type.matches(value) {
                Vec::new()
            } else {
                vec![Issue::new(
                    path.clone(),
                    format!("Expected {value_type}, getting {}", ValueType::of(value)),
                )]
            }
        }
        Schema::Tuple(items) => {
            let Some(elements) = value.as_array() else {
                return vec![Issue::new(
                    path.clone(),
                    format!("Expecting an array, got {value}"),
                )];
            };
            items
                .iter()
                .enumerate()
                .flat_map(|(index, item)| {
                    let element = elements.get(index).unwrap_or(&NULL);
                    diagnose(item, element, &path.child(index))
                })
                .collect()
        }
        Schema::Record(fields) => {
            let Some(object) = value.as_object() else {
                return vec![Issue::new(
                    path.clone(),
                    format!("Expecting an object, got {value}"),
                )];
            };
            fields
                .iter()
                .flat_map(|(key, field)| {
                    let member = object.get(key).unwrap_or(&NULL);
                    diagnose(field, member, &path.child(key.as_str()))
                })
                .collect()
        }
        Schema::Json(schema) => schema.diagnose(value, path),
        Schema::Custom(validator) => validator
            .diagnose(value)
            .into_iter()
            .map(|issue| issue.under(path))
            .collect(),
    }
}

/// Deep equality where numbers compare by value (`1` equals `1.0`).
fn literal_eq(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(expected), Value::Number(actual)) => number_eq(expected, actual),
        (Value::Array(expected), Value::Array(actual)) => {
            expected.len() == actual.len()
                && expected
                    .iter()
                    .zip(actual)
                    .all(|(expected, actual)| literal_eq(expected, actual))
        }
        (Value::Object(expected), Value::Object(actual)) => {
            expected.len() == actual.len()
                && expected.iter().all(|(key, expected)| {
                    actual
                        .get(key)
                        .is_some_and(|actual| literal_eq(expected, actual))
                })
        }
        _ => expected == actual,
    }
}

#[allow(clippy::float_cmp)]
fn number_eq(expected: &Number, actual: &Number) -> bool {
    if let (Some(expected), Some(actual)) = (expected.as_i64(), actual.as_i64()) {
        return expected == actual;
    }
    if let (Some(expected), Some(actual)) = (expected.as_u64(), actual.as_u64()) {
        return expected == actual;
    }
    match (expected.as_f64(), actual.as_f64()) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => false,
    }
}

/// Diagnose `value` against `schema` and fold any issues into an error
/// headed by `summary`.
pub fn validate(schema: &Schema, value: &Value, summary: &str) -> Result<(), ConstraintError> {
    let issues = diagnose(schema, value, &IssuePath::root());
    if issues.is_empty() {
        return Ok(());
    }
    tracing::trace!(summary, issue_count = issues.len(), "schema rejected value");
    Err(ConstraintError::new(summary, issues))
}
