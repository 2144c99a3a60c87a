//! Column type conversion.
//!
//! Values that cannot be converted become missing rather than failing the
//! whole transform.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use sweep_model::{ConversionTarget, any_to_f64, any_to_text, datetime_to_millis};

use crate::error::{Result, TransformError};
use crate::frame::{cell, require_column, with_column};

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Parses a conversion target name, rejecting unknown names with
/// [`TransformError::UnsupportedTarget`].
pub fn parse_target(name: &str) -> Result<ConversionTarget> {
    name.parse()
        .map_err(|_| TransformError::UnsupportedTarget(name.to_string()))
}

/// Converts one column to the target type in place.
pub fn convert_type(df: &DataFrame, column: &str, target: ConversionTarget) -> Result<DataFrame> {
    let source = require_column(df, column)?;
    let name = source.name().clone();
    let before = source.len() - source.null_count();

    let converted: Series = match target {
        ConversionTarget::Integer => {
            let values: Vec<Option<i64>> = (0..source.len())
                .map(|idx| any_to_f64(cell(source, idx)).and_then(integral_value))
                .collect();
            Series::new(name, values)
        }
        ConversionTarget::Float => {
            let values: Vec<Option<f64>> = (0..source.len())
                .map(|idx| any_to_f64(cell(source, idx)))
                .collect();
            Series::new(name, values)
        }
        ConversionTarget::Datetime => {
            let millis: Vec<Option<i64>> = (0..source.len())
                .map(|idx| datetime_millis(cell(source, idx)))
                .collect();
            Series::new(name, millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        ConversionTarget::String | ConversionTarget::Category => {
            let values: Vec<Option<String>> = (0..source.len())
                .map(|idx| any_to_text(cell(source, idx)))
                .collect();
            Series::new(name, values)
        }
    };

    let lost = before.saturating_sub(converted.len() - converted.null_count());
    if lost > 0 {
        tracing::debug!(column, %target, lost, "values could not be converted");
    }
    with_column(df, converted.into())
}

/// Keeps a number only when it is integral and fits an `i64` exactly.
fn integral_value(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER)
        .then_some(value as i64)
}

/// Reads a cell as epoch milliseconds. Text is parsed; numbers and other
/// types are not dates.
fn datetime_millis(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Datetime(v, unit, _) => Some(datetime_to_millis(v, unit)),
        AnyValue::String(s) => parse_datetime(s),
        AnyValue::StringOwned(s) => parse_datetime(&s),
        _ => None,
    }
}

/// Parses a date or date-time string to epoch milliseconds (UTC).
///
/// Accepts ISO 8601 (with `T` or space, optional fractional seconds and
/// trailing `Z`), `YYYY/MM/DD`, US `MM/DD/YYYY`, European `DD/MM/YYYY` and
/// `DD.MM.YYYY`, `DD-Mon-YYYY`, compact `YYYYMMDD` and month-name forms.
/// Ambiguous slash dates are read as US first.
pub fn parse_datetime(raw: &str) -> Option<i64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    let value = value.strip_suffix('Z').unwrap_or(value);
    try_parse_datetime(value)
        .or_else(|| try_parse_date(value).and_then(|d| d.and_hms_opt(0, 0, 0)))
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%d-%b-%Y %H:%M:%S",
        "%d-%b-%Y %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn try_parse_date(value: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%b-%Y",
        "%d-%B-%Y",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%d.%m.%Y",
        "%Y%m%d",
        "%b %d, %Y",
        "%B %d, %Y",
        "%d %b %Y",
        "%d %B %Y",
        "%Y-%b-%d",
        "%d-%m-%Y",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}
