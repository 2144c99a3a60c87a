//! Column-level transforms: rename, drop and derive.

use std::collections::HashSet;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sweep_model::{ArithmeticOp, column_f64_values};

use crate::error::{Result, TransformError};
use crate::expr::Expression;
use crate::frame::{require_column, require_numeric, with_column};

/// How a derived column is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeriveSource {
    /// `left <operator> right` over two numeric columns.
    Arithmetic {
        left: String,
        operator: ArithmeticOp,
        right: String,
    },
    /// A restricted expression evaluated per row.
    Expression { expression: String },
}

impl std::fmt::Display for DeriveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeriveSource::Arithmetic {
                left,
                operator,
                right,
            } => write!(f, "{left} {operator} {right}"),
            DeriveSource::Expression { expression } => f.write_str(expression),
        }
    }
}

/// Renames a column in place.
///
/// Renaming a column to its own name is a no-op.
pub fn rename_column(df: &DataFrame, old: &str, new: &str) -> Result<DataFrame> {
    if new.trim().is_empty() {
        return Err(TransformError::InvalidParameter(
            "new column name is empty".to_string(),
        ));
    }
    require_column(df, old)?;
    if old == new {
        return Ok(df.clone());
    }
    if df.column(new).is_ok() {
        return Err(TransformError::ColumnExists(new.to_string()));
    }
    let mut out = df.clone();
    out.rename(old, new.into())?;
    Ok(out)
}

/// Removes the named columns. Every name must exist.
pub fn drop_columns(df: &DataFrame, names: &[String]) -> Result<DataFrame> {
    for name in names {
        require_column(df, name)?;
    }
    let dropped: HashSet<&str> = names.iter().map(String::as_str).collect();
    let kept: Vec<Column> = df
        .get_columns()
        .iter()
        .filter(|column| !dropped.contains(column.name().as_str()))
        .cloned()
        .collect();
    Ok(DataFrame::new(kept)?)
}

/// Adds a computed column, replacing an existing column of the same name in
/// its current position.
pub fn derive_column(df: &DataFrame, name: &str, source: &DeriveSource) -> Result<DataFrame> {
    if name.trim().is_empty() {
        return Err(TransformError::InvalidParameter(
            "derived column name is empty".to_string(),
        ));
    }
    let column = match source {
        DeriveSource::Arithmetic {
            left,
            operator,
            right,
        } => arithmetic_column(df, name, left, *operator, right)?,
        DeriveSource::Expression { expression } => {
            Expression::compile(expression, df)?.evaluate_column(df, name)?
        }
    };
    tracing::debug!(column = name, dtype = %column.dtype(), %source, "derived column");
    with_column(df, column)
}

/// Element-wise arithmetic over two numeric columns into a `Float64`
/// column. Division by zero and missing operands give missing.
fn arithmetic_column(
    df: &DataFrame,
    name: &str,
    left: &str,
    op: ArithmeticOp,
    right: &str,
) -> Result<Column> {
    let lhs = column_f64_values(require_numeric(df, left)?);
    let rhs = column_f64_values(require_numeric(df, right)?);
    let values: Vec<Option<f64>> = lhs
        .iter()
        .zip(&rhs)
        .map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => op.apply(*a, *b),
            _ => None,
        })
        .collect();
    Ok(Series::new(name.into(), values).into())
}
