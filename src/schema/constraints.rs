//! Constraint kinds attached to fields
//!
//! Two families:
//! - `AggregateConstraint`: predicate over a whole column of a batch
//! - `ValueConstraint`: predicate over each converted value
//!
//! Both are plain data; `evaluate` / `check` are the interpreters.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::FieldType;

/// Column-level constraint evaluated over every value of a field in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateConstraint {
    /// Column sum equals `target` within tolerance
    SumEquals { target: f64 },
    /// Column sum lies in `[min, max]` within tolerance
    SumBetween { min: f64, max: f64 },
    /// Column mean equals `target` within tolerance
    MeanEquals { target: f64 },
    /// Every value is at least `min`
    MinAtLeast { min: f64 },
    /// Every value is at most `max`
    MaxAtMost { max: f64 },
    /// No value repeats (same as `unique: true` on the field)
    AllUnique,
}

/// Outcome of evaluating an aggregate over a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateOutcome {
    /// Computed aggregate (sum, mean, min or max)
    pub actual: f64,
    /// Whether the predicate held
    pub satisfied: bool,
}

impl AggregateConstraint {
    /// Short name of the aggregate function
    pub fn function(&self) -> &'static str {
        match self {
            AggregateConstraint::SumEquals { .. } | AggregateConstraint::SumBetween { .. } => "sum",
            AggregateConstraint::MeanEquals { .. } => "mean",
            AggregateConstraint::MinAtLeast { .. } => "min",
            AggregateConstraint::MaxAtMost { .. } => "max",
            AggregateConstraint::AllUnique => "unique",
        }
    }

    /// Target value for equality predicates
    pub fn target(&self) -> Option<f64> {
        match self {
            AggregateConstraint::SumEquals { target } | AggregateConstraint::MeanEquals { target } => {
                Some(*target)
            }
            _ => None,
        }
    }

    /// Evaluates the predicate over the non-null values of a column.
    ///
    /// Returns `None` for `AllUnique`, which is checked by grouping values
    /// rather than by an arithmetic aggregate.
    pub fn evaluate(&self, values: &[f64], tolerance: f64) -> Option<AggregateOutcome> {
        let sum = || values.iter().sum::<f64>();

        let outcome = match self {
            AggregateConstraint::SumEquals { target } => {
                let actual = sum();
                AggregateOutcome {
                    actual,
                    satisfied: (actual - target).abs() <= tolerance,
                }
            }
            AggregateConstraint::SumBetween { min, max } => {
                let actual = sum();
                AggregateOutcome {
                    actual,
                    satisfied: actual >= min - tolerance && actual <= max + tolerance,
                }
            }
            AggregateConstraint::MeanEquals { target } => {
                // Mean of an empty column is undefined and never matches
                let actual = if values.is_empty() {
                    f64::NAN
                } else {
                    sum() / values.len() as f64
                };
                AggregateOutcome {
                    actual,
                    satisfied: (actual - target).abs() <= tolerance,
                }
            }
            AggregateConstraint::MinAtLeast { min } => {
                let actual = values.iter().copied().fold(f64::INFINITY, f64::min);
                AggregateOutcome {
                    actual,
                    satisfied: values.is_empty() || actual >= min - tolerance,
                }
            }
            AggregateConstraint::MaxAtMost { max } => {
                let actual = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                AggregateOutcome {
                    actual,
                    satisfied: values.is_empty() || actual <= max + tolerance,
                }
            }
            AggregateConstraint::AllUnique => return None,
        };

        Some(outcome)
    }

    /// Rejects constraints that cannot apply to the given field type
    pub(crate) fn check_applicable(&self, field_type: &FieldType) -> Result<(), String> {
        match self {
            AggregateConstraint::AllUnique => {
                if matches!(field_type, FieldType::Object { .. }) {
                    return Err("uniqueness is not supported on object fields".into());
                }
            }
            AggregateConstraint::SumBetween { min, max } if min > max => {
                return Err(format!("{}: min {} exceeds max {}", self, min, max));
            }
            _ => {
                if !field_type.is_numeric() {
                    return Err(format!(
                        "{} requires a numeric field, found {}",
                        self,
                        field_type.type_name()
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for AggregateConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateConstraint::SumEquals { target } => write!(f, "sum == {}", target),
            AggregateConstraint::SumBetween { min, max } => write!(f, "{} <= sum <= {}", min, max),
            AggregateConstraint::MeanEquals { target } => write!(f, "mean == {}", target),
            AggregateConstraint::MinAtLeast { min } => write!(f, "min >= {}", min),
            AggregateConstraint::MaxAtMost { max } => write!(f, "max <= {}", max),
            AggregateConstraint::AllUnique => write!(f, "all unique"),
        }
    }
}

/// Per-value constraint checked after type conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueConstraint {
    /// Numeric value is greater than or equal to `value`
    Ge { value: f64 },
    /// Numeric value is less than or equal to `value`
    Le { value: f64 },
    /// String value matches the regular expression
    Pattern { regex: String },
    /// String has at least `len` characters
    MinLength { len: usize },
    /// String has at most `len` characters
    MaxLength { len: usize },
}

impl ValueConstraint {
    pub(crate) fn check_applicable(&self, field_type: &FieldType) -> Result<(), String> {
        match self {
            ValueConstraint::Ge { .. } | ValueConstraint::Le { .. } => {
                if !field_type.is_numeric() {
                    return Err(format!(
                        "'{}' requires a numeric field, found {}",
                        self,
                        field_type.type_name()
                    ));
                }
            }
            ValueConstraint::Pattern { regex } => {
                Regex::new(regex).map_err(|e| format!("invalid pattern '{}': {}", regex, e))?;
                if *field_type != FieldType::String {
                    return Err(format!("'{}' requires a string field", self));
                }
            }
            ValueConstraint::MinLength { .. } | ValueConstraint::MaxLength { .. } => {
                if *field_type != FieldType::String {
                    return Err(format!("'{}' requires a string field", self));
                }
            }
        }
        Ok(())
    }

    /// Compiles the constraint into a checker usable for a whole batch
    pub(crate) fn compile(&self) -> Result<CompiledCheck<'_>, regex::Error> {
        let pattern = match self {
            ValueConstraint::Pattern { regex } => Some(Regex::new(regex)?),
            _ => None,
        };
        Ok(CompiledCheck {
            constraint: self,
            pattern,
        })
    }
}

impl fmt::Display for ValueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueConstraint::Ge { value } => write!(f, ">= {}", value),
            ValueConstraint::Le { value } => write!(f, "<= {}", value),
            ValueConstraint::Pattern { regex } => write!(f, "matches /{}/", regex),
            ValueConstraint::MinLength { len } => write!(f, "length >= {}", len),
            ValueConstraint::MaxLength { len } => write!(f, "length <= {}", len),
        }
    }
}

/// A value constraint with its regex compiled once per validation run
pub(crate) struct CompiledCheck<'a> {
    pub(crate) constraint: &'a ValueConstraint,
    pattern: Option<Regex>,
}

impl CompiledCheck<'_> {
    /// Checks a numeric value
    pub(crate) fn check_number(&self, n: f64) -> bool {
        match self.constraint {
            ValueConstraint::Ge { value } => n >= *value,
            ValueConstraint::Le { value } => n <= *value,
            _ => true,
        }
    }

    /// Checks a string value
    pub(crate) fn check_str(&self, s: &str) -> bool {
        match self.constraint {
            ValueConstraint::Pattern { .. } => self.pattern.as_ref().map_or(true, |re| re.is_match(s)),
            ValueConstraint::MinLength { len } => s.chars().count() >= *len,
            ValueConstraint::MaxLength { len } => s.chars().count() <= *len,
            _ => true,
        }
    }
}
