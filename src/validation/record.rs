//! Raw validation input
//!
//! A `Record` is a plain JSON object; a `Batch` is the ordered sequence of
//! candidate records validated together. Elements are kept as raw JSON so
//! that a non-object element is reported as a violation rather than refused
//! at construction.

use serde_json::{Map, Value};
use thiserror::Error;

/// One candidate row: field name to raw value
pub type Record = Map<String, Value>;

/// Errors constructing a batch from raw input
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Batch must be a JSON array of records, got {0}")]
    NotAnArray(&'static str),

    #[error("Invalid batch JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered sequence of candidate records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    records: Vec<Value>,
}

impl Batch {
    /// Creates a batch from raw JSON values
    pub fn new(records: Vec<Value>) -> Self {
        Self { records }
    }

    /// Creates a batch from JSON objects
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: records.into_iter().map(Value::Object).collect(),
        }
    }

    /// Creates a batch from a JSON array
    pub fn from_json(value: Value) -> Result<Self, BatchError> {
        match value {
            Value::Array(records) => Ok(Self { records }),
            other => Err(BatchError::NotAnArray(json_type_name(&other))),
        }
    }

    /// Parses a batch from JSON text
    pub fn parse(text: &str) -> Result<Self, BatchError> {
        Self::from_json(serde_json::from_str(text)?)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates raw records in order
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.records.iter()
    }

    /// Returns the raw records
    pub fn records(&self) -> &[Value] {
        &self.records
    }
}

impl From<Vec<Value>> for Batch {
    fn from(records: Vec<Value>) -> Self {
        Self::new(records)
    }
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_array() {
        let batch = Batch::parse(r#"[{"name":"apple"},{"name":"banana"}]"#).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert_eq!(batch.records()[1]["name"], "banana");
    }

    #[test]
    fn test_non_array_rejected() {
        let err = Batch::from_json(json!({"name": "apple"})).unwrap_err();
        assert!(err.to_string().contains("got object"));

        assert!(matches!(Batch::parse("[1,"), Err(BatchError::Json(_))));
    }

    #[test]
    fn test_non_object_elements_kept() {
        let batch = Batch::from_json(json!([1, {"a": 1}])).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_from_records() {
        let mut record = Record::new();
        record.insert("product_id".into(), json!(1));
        let batch = Batch::from_records(vec![record]);
        assert_eq!(batch.iter().next().unwrap()["product_id"], 1);
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(1)), "int");
        assert_eq!(json_type_name(&json!(1.5)), "float");
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!([])), "array");
    }
}
