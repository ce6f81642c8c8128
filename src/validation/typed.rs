//! Typed validation output
//!
//! A batch that passes every check is promoted to a `TypedBatch`: each
//! record becomes a `TypedRecord` holding converted values in schema order.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Number, Value};

use super::record::Batch;

/// A value converted to its declared field type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Missing or null optional value
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Member of an enumerated literal set
    Literal(String),
    /// Nested record
    Record(TypedRecord),
}

impl TypedValue {
    /// Numeric view used by aggregates and numeric checks
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Int(i) => Some(*i as f64),
            TypedValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String view for string and literal values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) | TypedValue::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is the null marker
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    /// Converts back to plain JSON
    pub fn to_json(&self) -> Value {
        match self {
            TypedValue::Null => Value::Null,
            TypedValue::Bool(b) => Value::Bool(*b),
            TypedValue::Int(i) => Value::from(*i),
            TypedValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            TypedValue::String(s) | TypedValue::Literal(s) => Value::String(s.clone()),
            TypedValue::Record(r) => r.to_json(),
        }
    }

    /// Key used to group equal values when checking uniqueness
    pub(crate) fn unique_key(&self) -> String {
        self.canonical_json().to_string()
    }

    /// JSON form with `-0.0` folded into `0.0`, so numerically equal values share a key
    fn canonical_json(&self) -> Value {
        match self {
            TypedValue::Float(f) if *f == 0.0 => Value::from(0.0),
            TypedValue::Record(r) => Value::Object(
                r.values
                    .iter()
                    .map(|(k, v)| (k.clone(), v.canonical_json()))
                    .collect(),
            ),
            other => other.to_json(),
        }
    }
}

/// One validated record, values in schema order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TypedRecord {
    values: IndexMap<String, TypedValue>,
}

impl TypedRecord {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, field: impl Into<String>, value: TypedValue) {
        self.values.insert(field.into(), value);
    }

    /// Value of a field
    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.values.get(field)
    }

    /// Field names in schema order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Field/value pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Converts back to a plain JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

/// A fully validated batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedBatch {
    schema_id: String,
    schema_version: String,
    records: Vec<TypedRecord>,
}

impl TypedBatch {
    pub(crate) fn new(
        schema_id: impl Into<String>,
        schema_version: impl Into<String>,
        records: Vec<TypedRecord>,
    ) -> Self {
        Self {
            schema_id: schema_id.into(),
            schema_version: schema_version.into(),
            records,
        }
    }

    /// Schema the batch was validated against
    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    /// Schema version the batch was validated against
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// Validated records in input order
    pub fn records(&self) -> &[TypedRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one column in record order
    pub fn column<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a TypedValue> + 'a {
        self.records.iter().filter_map(move |r| r.get(field))
    }

    /// Converts the records to a JSON array
    pub fn to_json(&self) -> Value {
        Value::Array(self.records.iter().map(TypedRecord::to_json).collect())
    }

    /// Converts back into raw input, e.g. to validate again
    pub fn to_batch(&self) -> Batch {
        Batch::new(self.records.iter().map(TypedRecord::to_json).collect())
    }
}
