//! CLI command implementations
//!
//! Each command writes exactly one JSON object to stdout. Lifecycle events
//! go to stderr through the logger; the validator itself never logs.

use std::path::Path;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::ValidatorConfig;
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::schema::{Schema, SchemaLoader};
use crate::validation::{Batch, BatchValidator, ValidationResult};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_input, write_response};

/// How a successful command run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command succeeded; for `validate` the batch is valid
    Ok,
    /// Batch was rejected with violations
    Invalid,
}

impl Outcome {
    /// Process exit code for this outcome
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Ok => 0,
            Outcome::Invalid => 2,
        }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<Outcome> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<Outcome> {
    match cmd {
        Command::Validate {
            schema,
            schema_dir,
            schema_id,
            schema_version,
            batch,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let schema = match (schema, schema_dir) {
                (Some(path), _) => SchemaLoader::read_file(&path)?,
                (None, Some(dir)) => {
                    let id = schema_id.ok_or_else(|| {
                        CliError::Usage("--schema-id is required with --schema-dir".into())
                    })?;
                    resolve_schema(&dir, &id, &schema_version)?
                }
                (None, None) => {
                    return Err(CliError::Usage(
                        "either --schema or --schema-dir is required".into(),
                    ))
                }
            };
            validate(&schema, batch.as_deref(), &config)
        }
        Command::CheckSchema { schema } => check_schema(&schema),
    }
}

/// Validate a batch read from `batch_path` (or stdin) and print the report
pub fn validate(
    schema: &Schema,
    batch_path: Option<&Path>,
    config: &ValidatorConfig,
) -> CliResult<Outcome> {
    let text = read_input(batch_path)?;
    let (outcome, response) = validate_text(schema, &text, config, Uuid::new_v4())?;
    write_response(&response)?;
    Ok(outcome)
}

/// Validate batch JSON text and build the response object
pub fn validate_text(
    schema: &Schema,
    text: &str,
    config: &ValidatorConfig,
    run_id: Uuid,
) -> CliResult<(Outcome, Value)> {
    let batch = Batch::parse(text)?;
    let run_id = run_id.to_string();
    let records = batch.len().to_string();

    log_event_with_fields(Event::BatchRead, &[("records", &records)]);
    log_event_with_fields(
        Event::ValidationBegin,
        &[
            ("records", &records),
            ("run_id", &run_id),
            ("schema_id", schema.schema_id()),
            ("schema_version", schema.schema_version()),
        ],
    );

    match BatchValidator::new(config.clone()).validate(schema, &batch) {
        ValidationResult::Valid(typed) => {
            log_event_with_fields(
                Event::ValidationComplete,
                &[("records", &records), ("run_id", &run_id)],
            );
            let response = json!({
                "status": "ok",
                "run_id": run_id,
                "data": serde_json::to_value(&typed)?,
            });
            Ok((Outcome::Ok, response))
        }
        ValidationResult::Invalid(violations) => {
            let count = violations.len().to_string();
            log_event_with_fields(
                Event::ValidationRejected,
                &[("run_id", &run_id), ("violations", &count)],
            );
            let response = json!({
                "status": "invalid",
                "run_id": run_id,
                "violations": serde_json::to_value(&violations)?,
            });
            Ok((Outcome::Invalid, response))
        }
    }
}

/// Check that a schema file parses and is structurally valid
pub fn check_schema(path: &Path) -> CliResult<Outcome> {
    let schema = SchemaLoader::read_file(path)?;
    let fields = schema.fields().len().to_string();

    log_event_with_fields(
        Event::SchemaChecked,
        &[
            ("fields", &fields),
            ("schema_id", schema.schema_id()),
            ("schema_version", schema.schema_version()),
        ],
    );

    write_response(&json!({
        "status": "ok",
        "schema_id": schema.schema_id(),
        "schema_version": schema.schema_version(),
        "fields": schema.fields().len(),
    }))?;
    Ok(Outcome::Ok)
}

fn load_config(path: Option<&Path>) -> CliResult<ValidatorConfig> {
    let config = match path {
        Some(path) => ValidatorConfig::load(path)?,
        None => ValidatorConfig::default(),
    };
    Logger::set_min_severity(config.severity()?);

    let tolerance = config.float_tolerance.to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("float_tolerance", &tolerance)]);
    Ok(config)
}

fn resolve_schema(dir: &Path, schema_id: &str, schema_version: &str) -> CliResult<Schema> {
    let mut loader = SchemaLoader::new(dir);
    loader.load_all()?;
    Ok(loader.resolve(schema_id, schema_version)?.clone())
}
