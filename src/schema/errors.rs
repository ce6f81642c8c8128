//! Schema error types
//!
//! Error codes:
//! - BATCH_SCHEMA_INVALID (well-formed JSON whose schema definition is wrong:
//!   missing keys, unknown types, duplicate names, inapplicable constraints)
//! - BATCH_SCHEMA_MALFORMED (schema file unreadable or not valid JSON)
//! - BATCH_UNKNOWN_SCHEMA
//! - BATCH_UNKNOWN_SCHEMA_VERSION
//! - BATCH_SCHEMA_IMMUTABLE
//!
//! These are operational errors. A batch that fails validation is not an
//! error; it produces violations.

use std::fmt;

use thiserror::Error;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema definition is structurally invalid
    SchemaInvalid,
    /// Schema file could not be read or parsed
    SchemaMalformed,
    /// Schema ID not found
    UnknownSchema,
    /// Schema version not found
    UnknownSchemaVersion,
    /// Attempt to replace an existing schema version
    SchemaImmutable,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::SchemaInvalid => "BATCH_SCHEMA_INVALID",
            SchemaErrorCode::SchemaMalformed => "BATCH_SCHEMA_MALFORMED",
            SchemaErrorCode::UnknownSchema => "BATCH_UNKNOWN_SCHEMA",
            SchemaErrorCode::UnknownSchemaVersion => "BATCH_UNKNOWN_SCHEMA_VERSION",
            SchemaErrorCode::SchemaImmutable => "BATCH_SCHEMA_IMMUTABLE",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    schema_id: Option<String>,
    schema_version: Option<String>,
}

impl SchemaError {
    /// Create a structural validation error
    pub fn invalid_schema(schema_id: impl Into<String>, reason: impl Into<String>) -> Self {
        let id = schema_id.into();
        Self {
            code: SchemaErrorCode::SchemaInvalid,
            message: format!("Schema '{}' is invalid: {}", id, reason.into()),
            schema_id: Some(id),
            schema_version: None,
        }
    }

    /// Create an error for a schema file that is valid JSON but not a valid schema
    pub fn invalid_schema_file(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::SchemaInvalid,
            message: format!("Invalid schema file '{}': {}", path.into(), reason.into()),
            schema_id: None,
            schema_version: None,
        }
    }

    /// Create an error for a malformed schema file
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::SchemaMalformed,
            message: format!("Malformed schema file '{}': {}", path.into(), reason.into()),
            schema_id: None,
            schema_version: None,
        }
    }

    /// Create an unknown schema error
    pub fn unknown_schema(schema_id: impl Into<String>) -> Self {
        let id = schema_id.into();
        Self {
            code: SchemaErrorCode::UnknownSchema,
            message: format!("Schema '{}' not found", id),
            schema_id: Some(id),
            schema_version: None,
        }
    }

    /// Create an unknown schema version error
    pub fn unknown_version(schema_id: impl Into<String>, version: impl Into<String>) -> Self {
        let id = schema_id.into();
        let ver = version.into();
        Self {
            code: SchemaErrorCode::UnknownSchemaVersion,
            message: format!("Schema '{}' version '{}' not found", id, ver),
            schema_id: Some(id),
            schema_version: Some(ver),
        }
    }

    /// Create a schema immutable error
    pub fn schema_immutable(schema_id: impl Into<String>, version: impl Into<String>) -> Self {
        let id = schema_id.into();
        let ver = version.into();
        Self {
            code: SchemaErrorCode::SchemaImmutable,
            message: format!("Schema '{}' version '{}' is immutable", id, ver),
            schema_id: Some(id),
            schema_version: Some(ver),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the schema ID if applicable
    pub fn schema_id(&self) -> Option<&str> {
        self.schema_id.as_deref()
    }

    /// Returns the schema version if applicable
    pub fn schema_version(&self) -> Option<&str> {
        self.schema_version.as_deref()
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
