//! Schema type definitions
//!
//! Supported field types:
//! - string: UTF-8 string
//! - int: 64-bit signed integer
//! - float: 64-bit floating point
//! - bool: Boolean
//! - literal: one of a fixed set of strings
//! - object: nested record conforming to another schema

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::constraints::{AggregateConstraint, ValueConstraint};
use super::errors::{SchemaError, SchemaResult};

/// Supported field types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
    /// Enumerated string literal
    Literal {
        /// Accepted values
        values: Vec<String>,
    },
    /// Nested record with its own schema
    Object {
        /// Nested schema (boxed to allow recursive types)
        schema: Box<Schema>,
    },
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Literal { .. } => "literal",
            FieldType::Object { .. } => "object",
        }
    }

    /// Returns true for types an aggregate can be computed over
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Int | FieldType::Float)
    }

    /// Human readable expectation used in type mismatch reports
    pub fn describe(&self) -> String {
        match self {
            FieldType::Literal { values } => format!("one of [{}]", values.join(", ")),
            FieldType::Object { schema } => format!("object ({})", schema.schema_id()),
            other => other.type_name().to_string(),
        }
    }
}

fn default_required() -> bool {
    true
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name, unique within its schema
    pub name: String,
    /// Field data type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Whether the field must be present and non-null
    #[serde(default = "default_required")]
    pub required: bool,
    /// Whether values must be distinct across a batch
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
    /// Column-level constraints evaluated over the whole batch
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<AggregateConstraint>,
    /// Per-value constraints evaluated on each converted value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<ValueConstraint>,
}

impl FieldDef {
    /// Create a required field of the given type
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            unique: false,
            constraints: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Create a required string field
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Create a required int field
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Int)
    }

    /// Create a required float field
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float)
    }

    /// Create a required bool field
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Bool)
    }

    /// Create a required literal field accepting only `values`
    pub fn literal<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            FieldType::Literal {
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Create a required nested record field
    pub fn object(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(
            name,
            FieldType::Object {
                schema: Box::new(schema),
            },
        )
    }

    /// Mark the field optional (missing or null values become `Null`)
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Require values to be distinct across the batch
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Attach a column-level constraint
    pub fn with_constraint(mut self, constraint: AggregateConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Attach a per-value constraint
    pub fn with_check(mut self, check: ValueConstraint) -> Self {
        self.checks.push(check);
        self
    }

    /// Whether duplicates in this column are violations
    pub fn requires_unique(&self) -> bool {
        self.unique
            || self
                .constraints
                .iter()
                .any(|c| matches!(c, AggregateConstraint::AllUnique))
    }

    /// Returns the nested schema for object fields
    pub fn nested_schema(&self) -> Option<&Schema> {
        match &self.field_type {
            FieldType::Object { schema } => Some(schema),
            _ => None,
        }
    }

    fn validate_structure(&self, path: &str) -> Result<(), String> {
        if self.name.is_empty() {
            return Err(format!("{}: field name must not be empty", path));
        }

        match &self.field_type {
            FieldType::Literal { values } => {
                if values.is_empty() {
                    return Err(format!("{}: literal field needs at least one value", path));
                }
                let mut seen = HashSet::new();
                for value in values {
                    if !seen.insert(value.as_str()) {
                        return Err(format!("{}: literal value '{}' listed twice", path, value));
                    }
                }
            }
            FieldType::Object { schema } => {
                if self.unique {
                    return Err(format!("{}: uniqueness is not supported on object fields", path));
                }
                schema.validate_fields(path)?
            }
            _ => {}
        }

        for constraint in &self.constraints {
            constraint.check_applicable(&self.field_type).map_err(|e| format!("{}: {}", path, e))?;
        }
        for check in &self.checks {
            check.check_applicable(&self.field_type).map_err(|e| format!("{}: {}", path, e))?;
        }

        Ok(())
    }
}

fn default_version() -> String {
    "1".to_string()
}

/// Complete schema definition.
///
/// Fields are kept in declaration order and are read-only once the schema
/// exists. Both construction paths ([`Schema::builder`] and deserialization)
/// run structural validation, so every `Schema` value is well formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef")]
pub struct Schema {
    schema_id: String,
    schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    fields: Vec<FieldDef>,
}

/// Wire form of a schema before structural validation
#[derive(Deserialize)]
struct SchemaDef {
    schema_id: String,
    #[serde(default = "default_version")]
    schema_version: String,
    #[serde(default)]
    description: Option<String>,
    fields: Vec<FieldDef>,
}

impl TryFrom<SchemaDef> for Schema {
    type Error = SchemaError;

    fn try_from(def: SchemaDef) -> SchemaResult<Self> {
        let schema = Schema {
            schema_id: def.schema_id,
            schema_version: def.schema_version,
            description: def.description,
            fields: def.fields,
        };
        schema.validate_structure()?;
        Ok(schema)
    }
}

impl Schema {
    /// Start building a schema with the given identifier
    pub fn builder(schema_id: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            schema_id: schema_id.into(),
            schema_version: default_version(),
            description: None,
            fields: Vec::new(),
        }
    }

    /// Schema identifier
    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    /// Schema version
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// Optional description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Field definitions in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the unique key for this schema (id, version)
    pub fn key(&self) -> (&str, &str) {
        (&self.schema_id, &self.schema_version)
    }

    /// Validates the schema structure itself (not a batch)
    pub fn validate_structure(&self) -> SchemaResult<()> {
        if self.schema_id.is_empty() {
            return Err(SchemaError::invalid_schema("", "schema_id must not be empty"));
        }
        self.validate_fields("")
            .map_err(|reason| SchemaError::invalid_schema(&self.schema_id, reason))
    }

    fn validate_fields(&self, prefix: &str) -> Result<(), String> {
        let mut names = HashSet::new();
        for field in &self.fields {
            let path = make_path(prefix, &field.name);
            if !names.insert(field.name.as_str()) {
                return Err(format!("duplicate field name '{}'", path));
            }
            field.validate_structure(&path)?;
        }
        Ok(())
    }
}

/// Builder for [`Schema`]; `build` runs structural validation
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema_id: String,
    schema_version: String,
    description: Option<String>,
    fields: Vec<FieldDef>,
}

impl SchemaBuilder {
    /// Set the schema version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = version.into();
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a field
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Finish the schema, rejecting structurally invalid definitions
    pub fn build(self) -> SchemaResult<Schema> {
        let schema = Schema {
            schema_id: self.schema_id,
            schema_version: self.schema_version,
            description: self.description,
            fields: self.fields,
        };
        schema.validate_structure()?;
        Ok(schema)
    }
}

/// Creates a field path from prefix and field name.
pub(crate) fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shop_schema() -> Schema {
        Schema::builder("shop")
            .field(FieldDef::string("name"))
            .field(FieldDef::string("town"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_preserves_field_order() {
        let schema = Schema::builder("product")
            .version("v2")
            .field(FieldDef::int("product_id").unique())
            .field(FieldDef::string("name"))
            .field(FieldDef::float("demand_percentage"))
            .build()
            .unwrap();

        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["product_id", "name", "demand_percentage"]);
        assert_eq!(schema.key(), ("product", "v2"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = Schema::builder("product")
            .field(FieldDef::string("name"))
            .field(FieldDef::int("name"))
            .build();

        let err = result.unwrap_err();
        assert_eq!(err.code().code(), "BATCH_SCHEMA_INVALID");
        assert!(err.message().contains("duplicate field name 'name'"));
    }

    #[test]
    fn test_duplicate_nested_field_reports_path() {
        let nested = Schema {
            schema_id: "shop".into(),
            schema_version: "1".into(),
            description: None,
            fields: vec![FieldDef::string("town"), FieldDef::string("town")],
        };
        let result = Schema::builder("product")
            .field(FieldDef::object("place", nested))
            .build();

        assert!(result.unwrap_err().message().contains("place.town"));
    }

    #[test]
    fn test_empty_literal_rejected() {
        let result = Schema::builder("product")
            .field(FieldDef::literal("zone", Vec::<String>::new()))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_sum_on_string_field_rejected() {
        let result = Schema::builder("product")
            .field(
                FieldDef::string("name")
                    .with_constraint(AggregateConstraint::SumEquals { target: 1.0 }),
            )
            .build();
        assert!(result.unwrap_err().message().contains("numeric"));
    }

    #[test]
    fn test_unique_object_field_rejected() {
        let flagged = Schema::builder("product")
            .field(FieldDef::object("place", shop_schema()).unique())
            .build();
        let constrained = Schema::builder("product")
            .field(
                FieldDef::object("place", shop_schema())
                    .with_constraint(AggregateConstraint::AllUnique),
            )
            .build();

        for result in [flagged, constrained] {
            let err = result.unwrap_err();
            assert_eq!(err.code().code(), "BATCH_SCHEMA_INVALID");
            assert!(err.message().contains("not supported on object fields"));
        }
    }

    #[test]
    fn test_requires_unique_via_constraint() {
        let field = FieldDef::string("sku").with_constraint(AggregateConstraint::AllUnique);
        assert!(field.requires_unique());
        assert!(!FieldDef::string("sku").requires_unique());
    }

    #[test]
    fn test_schema_deserializes_from_json() {
        let schema: Schema = serde_json::from_value(json!({
            "schema_id": "product",
            "fields": [
                { "name": "product_id", "type": "int", "unique": true },
                { "name": "temperature_zone", "type": "literal", "values": ["dry", "cold", "frozen"] },
                {
                    "name": "demand_percentage",
                    "type": "float",
                    "constraints": [{ "kind": "sum_equals", "target": 100.0 }]
                },
                {
                    "name": "place",
                    "type": "object",
                    "required": false,
                    "schema": {
                        "schema_id": "shop",
                        "fields": [{ "name": "town", "type": "string" }]
                    }
                }
            ]
        }))
        .unwrap();

        assert!(schema.validate_structure().is_ok());
        assert_eq!(schema.schema_version(), "1");
        assert!(schema.field("product_id").unwrap().unique);
        assert!(schema.field("place").unwrap().nested_schema().is_some());
        assert!(!schema.field("place").unwrap().required);
        assert_eq!(
            schema.field("demand_percentage").unwrap().constraints,
            vec![AggregateConstraint::SumEquals { target: 100.0 }]
        );
    }

    #[test]
    fn test_invalid_schema_json_rejected() {
        let result: Result<Schema, _> = serde_json::from_value(json!({
            "schema_id": "product",
            "fields": [
                { "name": "id", "type": "int" },
                { "name": "id", "type": "string" }
            ]
        }));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("duplicate field name 'id'"));
    }

    #[test]
    fn test_serialize_round_trip() {
        let schema = Schema::builder("product")
            .description("fruit basket")
            .field(FieldDef::int("product_id").unique())
            .field(FieldDef::object("place", shop_schema()).optional())
            .build()
            .unwrap();

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["fields"][0]["type"], "int");
        assert_eq!(json["fields"][0]["unique"], true);
        assert!(json["fields"][1].get("unique").is_none());

        let back: Schema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_field_type_describe() {
        let zone = FieldType::Literal {
            values: vec!["dry".into(), "cold".into()],
        };
        assert_eq!(zone.describe(), "one of [dry, cold]");
        assert_eq!(FieldType::Int.describe(), "int");

        let place = FieldDef::object("place", shop_schema());
        assert_eq!(place.field_type.describe(), "object (shop)");
        assert_eq!(place.field_type.type_name(), "object");
    }
}
