//! Schema loader and registry
//!
//! - Schemas stored at `<schema_dir>/schema_<id>_<version>.json`
//! - One file per schema version
//! - Registered versions are immutable
//! - Malformed or structurally invalid files abort loading
//! - `Schema` values are valid by construction and are not re-checked here

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::observability::{log_event_with_fields, Event};

use super::errors::{SchemaError, SchemaResult};
use super::types::Schema;

/// Schema loader that reads schema files from disk and maintains an in-memory registry.
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Loaded schemas indexed by (schema_id, schema_version)
    schemas: HashMap<(String, String), Schema>,
}

impl SchemaLoader {
    /// Creates a new schema loader for the given schema directory.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Reads and structurally validates a single schema file without registering it.
    pub fn read_file(path: &Path) -> SchemaResult<Schema> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        // Deserialization runs the structural checks; data errors are schema problems
        serde_json::from_str(&content).map_err(|e| {
            let path = path.display().to_string();
            if e.is_data() {
                SchemaError::invalid_schema_file(path, e.to_string())
            } else {
                SchemaError::malformed_schema(path, format!("Invalid JSON: {}", e))
            }
        })
    }

    /// Loads all schema files from the schema directory.
    ///
    /// A missing directory is treated as empty.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }

        // Directory order is platform dependent
        paths.sort();
        for path in &paths {
            let schema = Self::read_file(path)?;
            self.register(schema)?;
        }

        let count = self.schemas.len().to_string();
        let dir = self.schema_dir.display().to_string();
        log_event_with_fields(Event::SchemasLoaded, &[("count", &count), ("schema_dir", &dir)]);

        Ok(())
    }

    /// Registers a schema directly (for testing or programmatic creation).
    pub fn register(&mut self, schema: Schema) -> SchemaResult<()> {
        let key = (
            schema.schema_id().to_string(),
            schema.schema_version().to_string(),
        );

        if self.schemas.contains_key(&key) {
            return Err(SchemaError::schema_immutable(&key.0, &key.1));
        }

        log_event_with_fields(
            Event::SchemaRegistered,
            &[("schema_id", &key.0), ("schema_version", &key.1)],
        );
        self.schemas.insert(key, schema);
        Ok(())
    }

    /// Gets a schema by ID and version.
    pub fn get(&self, schema_id: &str, schema_version: &str) -> Option<&Schema> {
        self.schemas
            .get(&(schema_id.to_string(), schema_version.to_string()))
    }

    /// Gets a schema, distinguishing an unknown ID from an unknown version.
    pub fn resolve(&self, schema_id: &str, schema_version: &str) -> SchemaResult<&Schema> {
        if !self.schema_id_exists(schema_id) {
            return Err(SchemaError::unknown_schema(schema_id));
        }
        self.get(schema_id, schema_version)
            .ok_or_else(|| SchemaError::unknown_version(schema_id, schema_version))
    }

    /// Checks if a schema exists.
    pub fn exists(&self, schema_id: &str, schema_version: &str) -> bool {
        self.get(schema_id, schema_version).is_some()
    }

    /// Checks if any version of a schema ID exists.
    pub fn schema_id_exists(&self, schema_id: &str) -> bool {
        self.schemas.keys().any(|(id, _)| id == schema_id)
    }

    /// Returns all loaded schemas.
    pub fn all_schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Saves a schema to disk at the standard location.
    pub fn save_schema(&self, schema: &Schema) -> SchemaResult<PathBuf> {
        let filename = format!(
            "schema_{}_{}.json",
            schema.schema_id(),
            schema.schema_version()
        );
        let path = self.schema_dir.join(&filename);

        if path.exists() {
            return Err(SchemaError::schema_immutable(
                schema.schema_id(),
                schema.schema_version(),
            ));
        }

        if !self.schema_dir.exists() {
            fs::create_dir_all(&self.schema_dir).map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to create schema directory: {}", e),
                )
            })?;
        }

        let content = serde_json::to_string_pretty(schema).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to serialize schema: {}", e),
            )
        })?;

        fs::write(&path, content).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to write file: {}", e),
            )
        })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AggregateConstraint, FieldDef};
    use tempfile::TempDir;

    fn sample_schema() -> Schema {
        Schema::builder("product")
            .version("v1")
            .field(FieldDef::int("product_id").unique())
            .field(FieldDef::string("name"))
            .field(
                FieldDef::float("demand_percentage")
                    .with_constraint(AggregateConstraint::SumEquals { target: 100.0 }),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register(sample_schema()).unwrap();

        let schema = loader.get("product", "v1");
        assert!(schema.is_some());
        assert_eq!(schema.unwrap().schema_id(), "product");
    }

    #[test]
    fn test_schema_immutability() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register(sample_schema()).unwrap();

        let result = loader.register(sample_schema());
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code().code(), "BATCH_SCHEMA_IMMUTABLE");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        let schema = sample_schema();
        let path = loader.save_schema(&schema).unwrap();
        assert!(path.ends_with("schema_product_v1.json"));

        let mut loader2 = SchemaLoader::new(temp_dir.path());
        loader2.load_all().unwrap();

        assert!(loader2.exists("product", "v1"));
        assert_eq!(loader2.get("product", "v1"), Some(&schema));
    }

    #[test]
    fn test_save_twice_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        loader.save_schema(&sample_schema()).unwrap();
        let err = loader.save_schema(&sample_schema()).unwrap_err();
        assert_eq!(err.code().code(), "BATCH_SCHEMA_IMMUTABLE");
    }

    #[test]
    fn test_resolve_distinguishes_id_and_version() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());
        loader.register(sample_schema()).unwrap();

        assert!(loader.resolve("product", "v1").is_ok());
        assert_eq!(
            loader.resolve("shop", "v1").unwrap_err().code().code(),
            "BATCH_UNKNOWN_SCHEMA"
        );
        assert_eq!(
            loader.resolve("product", "v2").unwrap_err().code().code(),
            "BATCH_UNKNOWN_SCHEMA_VERSION"
        );
    }

    #[test]
    fn test_malformed_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("schema_bad_1.json"), "{ not json").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        let err = loader.load_all().unwrap_err();
        assert_eq!(err.code().code(), "BATCH_SCHEMA_MALFORMED");
    }

    #[test]
    fn test_structurally_invalid_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("schema_dup_1.json");
        fs::write(
            &path,
            r#"{"schema_id":"dup","fields":[{"name":"a","type":"int"},{"name":"a","type":"int"}]}"#,
        )
        .unwrap();

        let err = SchemaLoader::read_file(&path).unwrap_err();
        assert_eq!(err.code().code(), "BATCH_SCHEMA_INVALID");
        assert!(err.message().contains("duplicate field name 'a'"));

        let mut loader = SchemaLoader::new(temp_dir.path());
        assert_eq!(loader.load_all().unwrap_err().code().code(), "BATCH_SCHEMA_INVALID");
    }

    #[test]
    fn test_load_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(&temp_dir.path().join("absent"));

        assert!(loader.load_all().is_ok());
        assert_eq!(loader.schema_count(), 0);
    }

    #[test]
    fn test_non_json_files_skipped() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("README.txt"), "not a schema").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        loader.load_all().unwrap();
        assert_eq!(loader.all_schemas().count(), 0);
    }
}
