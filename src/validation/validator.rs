//! Batch validator
//!
//! Validation semantics:
//! - Every record is checked against every field, in schema order
//! - Nested records are validated recursively; failures are wrapped in one
//!   `NestedValidationFailure` on the outer field with full inner paths
//! - Unique columns are grouped across the batch
//! - Aggregate constraints are evaluated over whole columns
//! - All violations are collected; there is no fail-fast
//!
//! Forbidden behaviors:
//! - Partial promotion (either every record becomes typed or none does)
//! - Default values for missing required fields
//! - Side effects of any kind

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::config::{UnknownFieldPolicy, ValidatorConfig};
use crate::schema::{make_path, AggregateConstraint, CompiledCheck, FieldDef, FieldType, Schema};

use super::coerce::convert;
use super::record::{json_type_name, Batch};
use super::typed::{TypedBatch, TypedRecord, TypedValue};
use super::violation::{ValidationResult, Violation};

/// Field path used for records that are not JSON objects
const ROOT: &str = "$root";

/// Validates batches of records against schemas.
///
/// The validator holds only its configuration and never mutates its input,
/// so the same batch always produces the same result.
#[derive(Debug, Clone, Default)]
pub struct BatchValidator {
    config: ValidatorConfig,
}

/// Per-field checks prepared once per validation run
struct FieldPlan<'s> {
    def: &'s FieldDef,
    checks: Vec<CompiledCheck<'s>>,
    nested: Option<SchemaPlan<'s>>,
}

struct SchemaPlan<'s> {
    fields: Vec<FieldPlan<'s>>,
}

impl<'s> SchemaPlan<'s> {
    fn new(schema: &'s Schema) -> Self {
        let fields = schema
            .fields()
            .iter()
            .map(|def| FieldPlan {
                def,
                // Patterns are compiled when the schema is built, so this never drops a check
                checks: def.checks.iter().filter_map(|c| c.compile().ok()).collect(),
                nested: def.nested_schema().map(SchemaPlan::new),
            })
            .collect();
        Self { fields }
    }

    fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.def.name == key)
    }
}

/// Typed record plus the fields whose value could not be converted
struct RecordOutcome<'s> {
    record: TypedRecord,
    failed_fields: Vec<&'s str>,
}

impl BatchValidator {
    /// Creates a validator with the given configuration.
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates a batch against a schema.
    ///
    /// Returns `Valid` with every record promoted when no violation is
    /// found, otherwise `Invalid` with the complete violation list.
    pub fn validate(&self, schema: &Schema, batch: &Batch) -> ValidationResult {
        let plan = SchemaPlan::new(schema);
        let mut violations = Vec::new();
        let mut records = Vec::with_capacity(batch.len());
        let mut failed_columns: HashSet<&str> = HashSet::new();

        for (index, raw) in batch.iter().enumerate() {
            match raw.as_object() {
                Some(obj) => {
                    let outcome = self.validate_record(&plan, obj, index, "", &mut violations);
                    failed_columns.extend(outcome.failed_fields);
                    records.push((index, outcome.record));
                }
                None => {
                    violations.push(Violation::TypeMismatch {
                        field: ROOT.to_string(),
                        record_index: index,
                        expected: "object".to_string(),
                        actual: json_type_name(raw).to_string(),
                    });
                    // The record contributes nothing to any column
                    failed_columns.extend(plan.fields.iter().map(|f| f.def.name.as_str()));
                }
            }
        }

        for field in &plan.fields {
            if field.def.requires_unique() {
                check_uniqueness(field.def, &records, &mut violations);
            }
        }

        for field in &plan.fields {
            if failed_columns.contains(field.def.name.as_str()) {
                continue;
            }
            self.check_aggregates(field.def, &records, &mut violations);
        }

        if violations.is_empty() {
            let records = records.into_iter().map(|(_, r)| r).collect();
            ValidationResult::Valid(TypedBatch::new(
                schema.schema_id(),
                schema.schema_version(),
                records,
            ))
        } else {
            ValidationResult::Invalid(violations)
        }
    }

    /// Validates one JSON object against a (possibly nested) schema plan.
    fn validate_record<'s>(
        &self,
        plan: &SchemaPlan<'s>,
        obj: &Map<String, Value>,
        index: usize,
        path_prefix: &str,
        violations: &mut Vec<Violation>,
    ) -> RecordOutcome<'s> {
        let mut record = TypedRecord::new();
        let mut failed_fields = Vec::new();

        for field in &plan.fields {
            let def = field.def;
            let field_path = make_path(path_prefix, &def.name);

            let value = match obj.get(&def.name) {
                None | Some(Value::Null) if !def.required => {
                    record.insert(def.name.clone(), TypedValue::Null);
                    continue;
                }
                None => {
                    violations.push(Violation::MissingField {
                        field: field_path,
                        record_index: index,
                    });
                    failed_fields.push(def.name.as_str());
                    continue;
                }
                Some(Value::Null) => {
                    violations.push(Violation::NullValue {
                        field: field_path,
                        record_index: index,
                    });
                    failed_fields.push(def.name.as_str());
                    continue;
                }
                Some(value) => value,
            };

            if let (FieldType::Object { .. }, Some(nested)) = (&def.field_type, &field.nested) {
                match value.as_object() {
                    Some(inner_obj) => {
                        let mut inner = Vec::new();
                        let outcome =
                            self.validate_record(nested, inner_obj, index, &field_path, &mut inner);
                        if inner.is_empty() {
                            record.insert(def.name.clone(), TypedValue::Record(outcome.record));
                        } else {
                            violations.push(Violation::NestedValidationFailure {
                                field: field_path,
                                record_index: index,
                                violations: inner,
                            });
                            failed_fields.push(def.name.as_str());
                        }
                    }
                    None => {
                        violations.push(Violation::TypeMismatch {
                            field: field_path,
                            record_index: index,
                            expected: def.field_type.describe(),
                            actual: json_type_name(value).to_string(),
                        });
                        failed_fields.push(def.name.as_str());
                    }
                }
                continue;
            }

            match convert(value, &def.field_type, self.config.coercion) {
                Ok(typed) => {
                    for check in &field.checks {
                        if !passes(check, &typed) {
                            violations.push(Violation::ValueConstraintViolation {
                                field: field_path.clone(),
                                record_index: index,
                                constraint: check.constraint.to_string(),
                                actual: typed.to_json(),
                            });
                        }
                    }
                    record.insert(def.name.clone(), typed);
                }
                Err(actual) => {
                    violations.push(Violation::TypeMismatch {
                        field: field_path,
                        record_index: index,
                        expected: def.field_type.describe(),
                        actual,
                    });
                    failed_fields.push(def.name.as_str());
                }
            }
        }

        if self.config.unknown_fields == UnknownFieldPolicy::Forbid {
            for key in obj.keys() {
                if !plan.declares(key) {
                    violations.push(Violation::UnknownField {
                        field: make_path(path_prefix, key),
                        record_index: index,
                    });
                }
            }
        }

        RecordOutcome {
            record,
            failed_fields,
        }
    }

    /// Evaluates the arithmetic aggregate constraints of one column.
    fn check_aggregates(
        &self,
        def: &FieldDef,
        records: &[(usize, TypedRecord)],
        violations: &mut Vec<Violation>,
    ) {
        let arithmetic: Vec<&AggregateConstraint> = def
            .constraints
            .iter()
            .filter(|c| !matches!(c, AggregateConstraint::AllUnique))
            .collect();
        if arithmetic.is_empty() {
            return;
        }

        let values: Vec<f64> = records
            .iter()
            .filter_map(|(_, r)| r.get(&def.name))
            .filter_map(TypedValue::as_f64)
            .collect();

        for constraint in arithmetic {
            let Some(outcome) = constraint.evaluate(&values, self.config.float_tolerance) else {
                continue;
            };
            if !outcome.satisfied {
                violations.push(Violation::AggregateConstraintViolation {
                    field: def.name.clone(),
                    constraint: constraint.clone(),
                    description: constraint.to_string(),
                    actual: outcome.actual,
                });
            }
        }
    }
}

/// Groups a unique column's values and reports every repeated one.
fn check_uniqueness(
    def: &FieldDef,
    records: &[(usize, TypedRecord)],
    violations: &mut Vec<Violation>,
) {
    // Keyed by canonical JSON; ordered by first occurrence
    let mut groups: IndexMap<String, (Value, Vec<usize>)> = IndexMap::new();

    for (index, record) in records {
        let Some(value) = record.get(&def.name) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        groups
            .entry(value.unique_key())
            .or_insert_with(|| (value.to_json(), Vec::new()))
            .1
            .push(*index);
    }

    for (_, (value, record_indices)) in groups {
        if record_indices.len() > 1 {
            violations.push(Violation::UniquenessViolation {
                field: def.name.clone(),
                value,
                record_indices,
            });
        }
    }
}

fn passes(check: &CompiledCheck<'_>, value: &TypedValue) -> bool {
    if let Some(n) = value.as_f64() {
        return check.check_number(n);
    }
    if let Some(s) = value.as_str() {
        return check.check_str(s);
    }
    true
}

/// Validates a batch with the default configuration.
pub fn validate(schema: &Schema, batch: &Batch) -> ValidationResult {
    BatchValidator::default().validate(schema, batch)
}
