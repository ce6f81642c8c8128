//! Observable events
//!
//! Events are explicit and typed; the string form is what appears in the
//! `event` key of a log line.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Schema directory loaded
    SchemasLoaded,
    /// Schema added to a registry
    SchemaRegistered,
    /// Schema structure checked
    SchemaChecked,

    // Validation
    /// Batch read from input
    BatchRead,
    /// Batch validation begins
    ValidationBegin,
    /// Batch promoted to a typed batch
    ValidationComplete,
    /// Batch rejected with violations
    ValidationRejected,

    // Failures
    /// Command failed with an operational error
    CommandFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemaRegistered => "SCHEMA_REGISTERED",
            Event::SchemaChecked => "SCHEMA_CHECKED",

            Event::BatchRead => "BATCH_READ",
            Event::ValidationBegin => "VALIDATION_BEGIN",
            Event::ValidationComplete => "VALIDATION_COMPLETE",
            Event::ValidationRejected => "VALIDATION_REJECTED",

            Event::CommandFailed => "COMMAND_FAILED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::CommandFailed)
    }

    /// Returns true if this event is per-step detail rather than a milestone
    pub fn is_detail(&self) -> bool {
        matches!(self, Event::SchemaRegistered | Event::BatchRead)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
