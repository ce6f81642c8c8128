//! Validator configuration
//!
//! Loaded from a JSON file; every key is optional:
//!
//! ```json
//! {
//!   "float_tolerance": 1e-6,
//!   "coercion": "lax",
//!   "unknown_fields": "ignore",
//!   "log_level": "info"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;

/// How raw values are converted to declared field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionMode {
    /// JSON types must match exactly (integers are still accepted as floats)
    Strict,
    /// Numeric strings, integral floats and boolean spellings are converted
    #[default]
    Lax,
}

/// What to do with record keys the schema does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Drop them from the typed record
    #[default]
    Ignore,
    /// Report an `UnknownField` violation
    Forbid,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_float_tolerance() -> f64 {
    1e-6
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Absolute tolerance for aggregate comparisons
    #[serde(default = "default_float_tolerance")]
    pub float_tolerance: f64,

    /// Value conversion mode
    #[serde(default)]
    pub coercion: CoercionMode,

    /// Handling of undeclared record keys
    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,

    /// Minimum log severity: trace, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            float_tolerance: default_float_tolerance(),
            coercion: CoercionMode::default(),
            unknown_fields: UnknownFieldPolicy::default(),
            log_level: default_log_level(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: ValidatorConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.float_tolerance.is_finite() || self.float_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "float_tolerance must be a finite non-negative number, got {}",
                self.float_tolerance
            )));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed minimum log severity
    pub fn severity(&self) -> ConfigResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error.",
                self.log_level
            ))
        })
    }

    /// Builder-style setter for the tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.float_tolerance = tolerance;
        self
    }

    /// Builder-style setter for the coercion mode
    pub fn with_coercion(mut self, coercion: CoercionMode) -> Self {
        self.coercion = coercion;
        self
    }

    /// Builder-style setter for the unknown-field policy
    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }
}
