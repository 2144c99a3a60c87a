//! Missing-value imputation.

use polars::prelude::*;
use sweep_model::{
    FillStrategy, Literal, any_to_text, column_f64_values, column_missing_count, is_integer_dtype,
    is_missing, is_numeric_dtype,
};

use crate::error::Result;
use crate::frame::{cell, require_column, with_column};

/// Arithmetic mean of the values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of the values; even counts average the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Fills missing values in every numeric column with the column's mean or
/// median.
///
/// Filled columns become `Float64`. Columns without missing values,
/// non-numeric columns and all-missing columns are left as they are.
pub fn fill_numeric(df: &DataFrame, strategy: FillStrategy) -> Result<DataFrame> {
    let mut out = df.clone();
    for column in df.get_columns() {
        if !is_numeric_dtype(column.dtype()) || column_missing_count(column) == 0 {
            continue;
        }
        let values = column_f64_values(column);
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let fill = match strategy {
            FillStrategy::Mean => mean(&present),
            FillStrategy::Median => median(&present),
        };
        let Some(fill) = fill else {
            tracing::debug!(column = %column.name(), "all values missing, not filled");
            continue;
        };
        let filled: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill)).collect();
        out.with_column(Series::new(column.name().clone(), filled))?;
        tracing::debug!(column = %column.name(), %strategy, "filled missing values");
    }
    Ok(out)
}

/// Replaces missing entries of one column with a literal.
///
/// The literal is used as given. If it fits the column's type the dtype is
/// kept (a non-integral number widens an integer column to `Float64`);
/// otherwise the column becomes text, with existing values rendered as text.
pub fn fill_custom(df: &DataFrame, column: &str, value: &Literal) -> Result<DataFrame> {
    let source = require_column(df, column)?;
    if column_missing_count(source) == 0 {
        return Ok(df.clone());
    }
    let dtype = source.dtype().clone();
    let name = source.name().clone();

    let filled: Series = match value {
        Literal::Int(v) if is_integer_dtype(&dtype) => {
            let values: Vec<Option<i64>> = (0..source.len())
                .map(|idx| match cell(source, idx) {
                    existing if is_missing(&existing) => None,
                    existing => existing.extract::<i64>(),
                })
                .map(|existing| existing.or(Some(*v)))
                .collect();
            Series::new(name, values).cast(&dtype)?
        }
        Literal::Int(_) | Literal::Float(_) if is_numeric_dtype(&dtype) => {
            let fill = value.as_f64().unwrap_or(f64::NAN);
            let values: Vec<f64> = column_f64_values(source)
                .into_iter()
                .map(|existing| existing.unwrap_or(fill))
                .collect();
            let series = Series::new(name, values);
            let keep_integer = is_integer_dtype(&dtype) && fill.fract() == 0.0;
            if keep_integer || (!is_integer_dtype(&dtype) && dtype != DataType::Float64) {
                series.cast(&dtype)?
            } else {
                series
            }
        }
        Literal::Bool(v) if dtype == DataType::Boolean => {
            let values: Vec<Option<bool>> = (0..source.len())
                .map(|idx| match cell(source, idx) {
                    AnyValue::Boolean(b) => Some(b),
                    _ => Some(*v),
                })
                .collect();
            Series::new(name, values)
        }
        _ => {
            let fill = value.to_string();
            let values: Vec<String> = (0..source.len())
                .map(|idx| any_to_text(cell(source, idx)).unwrap_or_else(|| fill.clone()))
                .collect();
            Series::new(name, values)
        }
    };
    tracing::debug!(column, dtype = %filled.dtype(), "filled missing values with literal");
    with_column(df, filled.into())
}
