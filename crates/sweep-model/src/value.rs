//! Polars `AnyValue` helpers shared by every crate.
//!
//! Missing data is either a Polars null or a floating-point `NaN`; both are
//! reported as missing by [`is_missing`] and rendered as empty text.

use std::fmt;

use polars::prelude::{AnyValue, Column, DataType, TimeUnit};
use serde::{Deserialize, Serialize};

/// Returns true for nulls and floating-point `NaN`.
pub fn is_missing(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::Float32(v) => v.is_nan(),
        AnyValue::Float64(v) => v.is_nan(),
        _ => false,
    }
}

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for missing values, properly formats numeric types.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    if is_missing(&value) {
        return String::new();
    }
    match value {
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Datetime(v, unit, _) => {
            format_datetime_millis(datetime_to_millis(v, unit), "%Y-%m-%d %H:%M:%S")
                .unwrap_or_default()
        }
        other => other.to_string(),
    }
}

/// Converts a value to text, keeping missing values as `None`.
pub fn any_to_text(value: AnyValue<'_>) -> Option<String> {
    if is_missing(&value) {
        None
    } else {
        Some(any_to_string(value))
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Converts an AnyValue to f64, returning None for non-numeric or missing values.
///
/// Text is parsed, booleans map to 1/0.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    if is_missing(&value) {
        return None;
    }
    match value {
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Reads a numeric cell without parsing text. Used by statistics, which
/// only look at numeric columns.
pub fn numeric_value(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::String(_) | AnyValue::StringOwned(_) | AnyValue::Boolean(_) => None,
        other => any_to_f64(other),
    }
}

/// Parses a string as f64, returning None for invalid, empty or NaN strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Returns true for integer and floating-point dtypes.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Returns true for integer dtypes.
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    is_numeric_dtype(dtype) && !matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Returns true for text columns.
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String)
}

/// Collects a column's numeric values, keeping missing entries as `None`.
pub fn column_f64_values(column: &Column) -> Vec<Option<f64>> {
    (0..column.len())
        .map(|idx| numeric_value(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

/// Converts a datetime physical value to epoch milliseconds.
pub fn datetime_to_millis(value: i64, unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => value.div_euclid(1_000_000),
        TimeUnit::Microseconds => value.div_euclid(1_000),
        TimeUnit::Milliseconds => value,
    }
}

/// Formats epoch milliseconds with a chrono format string.
pub fn format_datetime_millis(millis: i64, format: &str) -> Option<String> {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc().format(format).to_string())
}

/// Days from the spreadsheet epoch (1899-12-30) to 1970-01-01.
pub const EXCEL_EPOCH_OFFSET_DAYS: f64 = 25_569.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Converts a spreadsheet date serial (1900 date system) to epoch milliseconds.
pub fn excel_serial_to_millis(serial: f64) -> i64 {
    ((serial - EXCEL_EPOCH_OFFSET_DAYS) * MILLIS_PER_DAY).round() as i64
}

/// Converts epoch milliseconds to a spreadsheet date serial.
pub fn millis_to_excel_serial(millis: i64) -> f64 {
    millis as f64 / MILLIS_PER_DAY + EXCEL_EPOCH_OFFSET_DAYS
}

/// A literal cell value supplied by the user (fill values, recipe parameters).
///
/// Literals are stored as given: they are never parsed into another type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    /// Numeric view of the literal; text and booleans are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(v) => Some(*v as f64),
            Literal::Float(v) => Some(*v),
            Literal::Bool(_) | Literal::Text(_) => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(v) => write!(f, "{v}"),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => f.write_str(&format_numeric(*v)),
            Literal::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}
