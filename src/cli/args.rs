//! CLI argument definitions using clap
//!
//! Commands:
//! - batchval validate --schema <path> [--batch <path>] [--config <path>]
//! - batchval validate --schema-dir <dir> --schema-id <id> [--schema-version <v>] ...
//! - batchval check-schema --schema <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// batchval - validate record batches against schemas with column constraints
#[derive(Parser, Debug)]
#[command(name = "batchval")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a batch (JSON array of records) against a schema
    Validate {
        /// Path to a schema file
        #[arg(long, required_unless_present = "schema_dir", conflicts_with = "schema_dir")]
        schema: Option<PathBuf>,

        /// Directory of schema_<id>_<version>.json files
        #[arg(long, requires = "schema_id")]
        schema_dir: Option<PathBuf>,

        /// Schema to use from --schema-dir
        #[arg(long)]
        schema_id: Option<String>,

        /// Schema version to use from --schema-dir
        #[arg(long, default_value = "1")]
        schema_version: String,

        /// Path to the batch file (stdin when omitted)
        #[arg(long)]
        batch: Option<PathBuf>,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check that a schema file is well formed
    CheckSchema {
        /// Path to a schema file
        #[arg(long)]
        schema: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
