//! Schema subsystem
//!
//! Schemas are immutable declarations of a record's fields, types and
//! constraints. They are built once (via [`Schema::builder`] or loaded from
//! JSON) and structurally validated before use.
//!
//! # Design Principles
//!
//! - Ordered fields, unique names (checked recursively)
//! - Constraints are typed data, evaluated by interpreters
//! - Nested records reference another schema explicitly
//! - Registered schema versions never change

mod constraints;
mod errors;
mod loader;
mod types;

pub use constraints::{AggregateConstraint, AggregateOutcome, ValueConstraint};
pub(crate) use constraints::CompiledCheck;
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::SchemaLoader;
pub(crate) use types::make_path;
pub use types::{FieldDef, FieldType, Schema, SchemaBuilder};
