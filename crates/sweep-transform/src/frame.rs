//! DataFrame helpers shared by the transforms.

use polars::prelude::*;
use sweep_model::{is_numeric_dtype, is_text_dtype};

use crate::error::{Result, TransformError};

/// Looks up a column, mapping a miss to [`TransformError::ColumnNotFound`].
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| TransformError::ColumnNotFound(name.to_string()))
}

/// Looks up a numeric column.
pub fn require_numeric<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    let column = require_column(df, name)?;
    if !is_numeric_dtype(column.dtype()) {
        return Err(TransformError::NotNumeric {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        });
    }
    Ok(column)
}

/// Looks up a text column.
pub fn require_text<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    let column = require_column(df, name)?;
    if !is_text_dtype(column.dtype()) {
        return Err(TransformError::NotText {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        });
    }
    Ok(column)
}

/// Reads one cell; out-of-range reads are missing.
pub fn cell(column: &Column, idx: usize) -> AnyValue<'_> {
    column.get(idx).unwrap_or(AnyValue::Null)
}

/// Keeps the rows whose mask entry is true, preserving order.
pub fn filter_by_mask(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Returns a copy of `df` with `column` replacing the same-named column in
/// place, or appended when no such column exists.
pub fn with_column(df: &DataFrame, column: Column) -> Result<DataFrame> {
    let mut out = df.clone();
    out.with_column(column)?;
    Ok(out)
}
