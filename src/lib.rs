//! batchval - all-or-nothing validation of record batches
//!
//! A [`Schema`] declares typed fields, per-value checks and per-column
//! constraints (uniqueness, aggregates such as "column sum equals 100").
//! [`validate`] either promotes every record of a [`Batch`] to a typed
//! record or returns every [`Violation`] it found.
//!
//! ```ignore
//! use batchval::{validate, AggregateConstraint, Batch, FieldDef, Schema};
//!
//! let schema = Schema::builder("product")
//!     .field(FieldDef::int("product_id").unique())
//!     .field(FieldDef::float("demand_percentage")
//!         .with_constraint(AggregateConstraint::SumEquals { target: 100.0 }))
//!     .build()?;
//! let result = validate(&schema, &Batch::parse(input)?);
//! ```

pub mod cli;
pub mod config;
pub mod observability;
pub mod schema;
pub mod validation;

pub use config::{CoercionMode, UnknownFieldPolicy, ValidatorConfig};
pub use schema::{AggregateConstraint, FieldDef, FieldType, Schema, SchemaError, ValueConstraint};
pub use validation::{
    validate, Batch, BatchValidator, TypedBatch, TypedRecord, TypedValue, ValidationResult,
    Violation,
};
