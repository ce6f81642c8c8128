//! Violations and the validation result
//!
//! A violation is data, not an error: the validator collects every one it
//! finds and returns them together.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::schema::AggregateConstraint;

use super::typed::TypedBatch;

/// One way a record or batch failed to satisfy its schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Required field absent from a record
    MissingField { field: String, record_index: usize },

    /// Required field present but null
    NullValue { field: String, record_index: usize },

    /// Record key not declared in the schema
    UnknownField { field: String, record_index: usize },

    /// Value does not convert to the declared type
    TypeMismatch {
        field: String,
        record_index: usize,
        expected: String,
        actual: String,
    },

    /// Converted value fails a per-value constraint
    ValueConstraintViolation {
        field: String,
        record_index: usize,
        constraint: String,
        actual: Value,
    },

    /// Nested record failed its own schema; inner fields carry full paths
    NestedValidationFailure {
        field: String,
        record_index: usize,
        violations: Vec<Violation>,
    },

    /// Value of a unique column appears in more than one record
    UniquenessViolation {
        field: String,
        value: Value,
        record_indices: Vec<usize>,
    },

    /// Column aggregate fails its predicate
    AggregateConstraintViolation {
        field: String,
        constraint: AggregateConstraint,
        description: String,
        actual: f64,
    },
}

impl Violation {
    /// Field path the violation is attributed to
    pub fn field(&self) -> &str {
        match self {
            Violation::MissingField { field, .. }
            | Violation::NullValue { field, .. }
            | Violation::UnknownField { field, .. }
            | Violation::TypeMismatch { field, .. }
            | Violation::ValueConstraintViolation { field, .. }
            | Violation::NestedValidationFailure { field, .. }
            | Violation::UniquenessViolation { field, .. }
            | Violation::AggregateConstraintViolation { field, .. } => field,
        }
    }

    /// Record the violation belongs to; `None` for column-level violations
    pub fn record_index(&self) -> Option<usize> {
        match self {
            Violation::MissingField { record_index, .. }
            | Violation::NullValue { record_index, .. }
            | Violation::UnknownField { record_index, .. }
            | Violation::TypeMismatch { record_index, .. }
            | Violation::ValueConstraintViolation { record_index, .. }
            | Violation::NestedValidationFailure { record_index, .. } => Some(*record_index),
            Violation::UniquenessViolation { .. } | Violation::AggregateConstraintViolation { .. } => {
                None
            }
        }
    }

    /// Stable code for the violation kind
    pub fn code(&self) -> &'static str {
        match self {
            Violation::MissingField { .. } => "MISSING_FIELD",
            Violation::NullValue { .. } => "NULL_VALUE",
            Violation::UnknownField { .. } => "UNKNOWN_FIELD",
            Violation::TypeMismatch { .. } => "TYPE_MISMATCH",
            Violation::ValueConstraintViolation { .. } => "VALUE_CONSTRAINT",
            Violation::NestedValidationFailure { .. } => "NESTED_VALIDATION_FAILURE",
            Violation::UniquenessViolation { .. } => "UNIQUENESS",
            Violation::AggregateConstraintViolation { .. } => "AGGREGATE_CONSTRAINT",
        }
    }

    /// Flattens nested failures into their innermost violations
    pub fn leaves(&self) -> Vec<&Violation> {
        match self {
            Violation::NestedValidationFailure { violations, .. } => {
                violations.iter().flat_map(Violation::leaves).collect()
            }
            other => vec![other],
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingField { field, record_index } => {
                write!(f, "record {}: field '{}' is missing", record_index, field)
            }
            Violation::NullValue { field, record_index } => {
                write!(f, "record {}: field '{}' is null", record_index, field)
            }
            Violation::UnknownField { field, record_index } => {
                write!(f, "record {}: field '{}' is not declared", record_index, field)
            }
            Violation::TypeMismatch {
                field,
                record_index,
                expected,
                actual,
            } => write!(
                f,
                "record {}: field '{}': expected {}, got {}",
                record_index, field, expected, actual
            ),
            Violation::ValueConstraintViolation {
                field,
                record_index,
                constraint,
                actual,
            } => write!(
                f,
                "record {}: field '{}': value {} does not satisfy {}",
                record_index, field, actual, constraint
            ),
            Violation::NestedValidationFailure {
                field,
                record_index,
                violations,
            } => write!(
                f,
                "record {}: nested field '{}' has {} violation(s)",
                record_index,
                field,
                violations.len()
            ),
            Violation::UniquenessViolation {
                field,
                value,
                record_indices,
            } => write!(
                f,
                "field '{}': value {} repeats in records {:?}",
                field, value, record_indices
            ),
            Violation::AggregateConstraintViolation {
                field,
                constraint,
                description,
                actual,
            } => write!(
                f,
                "field '{}': expected {}, got {} = {}",
                field,
                description,
                constraint.function(),
                actual
            ),
        }
    }
}

/// Outcome of validating a batch
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Every record was promoted
    Valid(TypedBatch),
    /// At least one violation; nothing was promoted
    Invalid(Vec<Violation>),
}

impl ValidationResult {
    /// Whether the batch passed
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    /// Typed batch for a valid result
    pub fn typed(&self) -> Option<&TypedBatch> {
        match self {
            ValidationResult::Valid(batch) => Some(batch),
            ValidationResult::Invalid(_) => None,
        }
    }

    /// Violations for an invalid result (empty when valid)
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationResult::Valid(_) => &[],
            ValidationResult::Invalid(violations) => violations,
        }
    }

    /// Converts into a standard `Result`
    pub fn into_result(self) -> Result<TypedBatch, Vec<Violation>> {
        match self {
            ValidationResult::Valid(batch) => Ok(batch),
            ValidationResult::Invalid(violations) => Err(violations),
        }
    }
}
