//! CLI module for batchval
//!
//! Provides command-line interface for:
//! - validate: Validate a batch against a schema
//! - check-schema: Check a schema file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check_schema, run, run_command, validate, validate_text, Outcome};
pub use errors::{CliError, CliResult};
pub use io::{read_input, write_error, write_response};
