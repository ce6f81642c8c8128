//! Conversion of raw JSON values to declared scalar types
//!
//! Strict mode accepts exact JSON types only; integers are accepted for
//! float fields in both modes. Lax mode additionally converts:
//! - integral floats and numeric strings to int
//! - numeric strings to float
//! - `"true"`/`"false"`/`"yes"`/`"no"`/`"on"`/`"off"`/`"1"`/`"0"` and 0/1 to bool
//!
//! Non-finite floats are never accepted.

use serde_json::Value;

use crate::config::CoercionMode;
use crate::schema::FieldType;

use super::record::json_type_name;
use super::typed::TypedValue;

/// Converts a non-null scalar value.
///
/// Returns the description of the offending value on failure. Object fields
/// are handled by the validator and always fail here.
pub(crate) fn convert(
    value: &Value,
    field_type: &FieldType,
    mode: CoercionMode,
) -> Result<TypedValue, String> {
    let lax = mode == CoercionMode::Lax;
    let mismatch = || json_type_name(value).to_string();

    match field_type {
        FieldType::String => match value {
            Value::String(s) => Ok(TypedValue::String(s.clone())),
            _ => Err(mismatch()),
        },
        FieldType::Int => match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(TypedValue::Int(i));
                }
                match n.as_f64() {
                    Some(f) if lax && is_integral(f) => Ok(TypedValue::Int(f as i64)),
                    _ => Err(mismatch()),
                }
            }
            Value::String(s) if lax => s
                .trim()
                .parse::<i64>()
                .map(TypedValue::Int)
                .map_err(|_| format!("string '{}'", s)),
            _ => Err(mismatch()),
        },
        FieldType::Float => match value {
            Value::Number(n) => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(TypedValue::Float)
                .ok_or_else(mismatch),
            Value::String(s) if lax => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(TypedValue::Float)
                .ok_or_else(|| format!("string '{}'", s)),
            _ => Err(mismatch()),
        },
        FieldType::Bool => match value {
            Value::Bool(b) => Ok(TypedValue::Bool(*b)),
            Value::String(s) if lax => parse_bool(s)
                .map(TypedValue::Bool)
                .ok_or_else(|| format!("string '{}'", s)),
            Value::Number(n) if lax => match n.as_i64() {
                Some(0) => Ok(TypedValue::Bool(false)),
                Some(1) => Ok(TypedValue::Bool(true)),
                _ => Err(format!("number {}", n)),
            },
            _ => Err(mismatch()),
        },
        FieldType::Literal { values } => match value {
            Value::String(s) if values.iter().any(|v| v == s) => Ok(TypedValue::Literal(s.clone())),
            Value::String(s) => Err(format!("'{}'", s)),
            _ => Err(mismatch()),
        },
        FieldType::Object { .. } => Err(mismatch()),
    }
}

fn is_integral(f: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
