//! Batch validation
//!
//! `validate(schema, batch)` checks every record's shape and types, every
//! unique column and every aggregate constraint, then either promotes the
//! whole batch to a [`TypedBatch`] or returns every [`Violation`] found.

mod coerce;
mod record;
mod typed;
mod validator;
mod violation;

pub use record::{Batch, BatchError, Record};
pub use typed::{TypedBatch, TypedRecord, TypedValue};
pub use validator::{validate, BatchValidator};
pub use violation::{ValidationResult, Violation};
