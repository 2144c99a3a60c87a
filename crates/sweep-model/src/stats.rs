//! Table statistics and before/after change summaries.

use std::collections::HashSet;

use polars::prelude::{AnyValue, Column, DataFrame};
use serde::Serialize;

use crate::value::{column_f64_values, is_missing, is_numeric_dtype};

/// Headline numbers shown for a loaded table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
    pub duplicate_rows: usize,
}

/// Per-column dtype and missing-value counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: String,
    pub missing: usize,
}

/// Summary statistics for one numeric column, as a dataframe `describe()`
/// reports them. Every statistic is `None` when the column has no values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Computes [`TableStats`] for a table.
pub fn table_stats(df: &DataFrame) -> TableStats {
    TableStats {
        rows: df.height(),
        columns: df.width(),
        missing_cells: missing_cell_count(df),
        duplicate_rows: duplicate_mask(df).iter().filter(|dup| **dup).count(),
    }
}

/// Counts missing cells (nulls and `NaN`) across the whole table.
pub fn missing_cell_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(column_missing_count).sum()
}

/// Counts missing cells in one column.
pub fn column_missing_count(column: &Column) -> usize {
    (0..column.len())
        .filter(|idx| is_missing(&column.get(*idx).unwrap_or(AnyValue::Null)))
        .count()
}

/// Summaries for every column, in table order.
pub fn column_summaries(df: &DataFrame) -> Vec<ColumnSummary> {
    df.get_columns()
        .iter()
        .map(|column| ColumnSummary {
            name: column.name().to_string(),
            dtype: column.dtype().to_string(),
            missing: column_missing_count(column),
        })
        .collect()
}

/// Linearly interpolated quantile of sorted values, `q` in `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Describes every numeric column in table order; other columns are skipped.
pub fn describe(df: &DataFrame) -> Vec<NumericSummary> {
    df.get_columns()
        .iter()
        .filter(|column| is_numeric_dtype(column.dtype()))
        .map(describe_column)
        .collect()
}

fn describe_column(column: &Column) -> NumericSummary {
    let mut values: Vec<f64> = column_f64_values(column).into_iter().flatten().collect();
    values.sort_by(f64::total_cmp);
    let mean = (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);
    NumericSummary {
        name: column.name().to_string(),
        count: values.len(),
        mean,
        std: mean.and_then(|mean| sample_std(&values, mean)),
        min: values.first().copied(),
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values.last().copied(),
    }
}

/// Builds a comparable key for one row.
///
/// Missing cells share a single key so that null and `NaN` compare equal,
/// matching how duplicate detection treats absent data. Negative zero is
/// keyed as zero.
pub fn row_key(columns: &[Column], idx: usize) -> Vec<String> {
    columns
        .iter()
        .map(|column| {
            let value = match column.get(idx).unwrap_or(AnyValue::Null) {
                AnyValue::Float32(v) => AnyValue::Float32(v + 0.0),
                AnyValue::Float64(v) => AnyValue::Float64(v + 0.0),
                other => other,
            };
            if is_missing(&value) {
                "<missing>".to_string()
            } else {
                format!("{value:?}")
            }
        })
        .collect()
}

/// Marks rows that repeat an earlier row in every column.
pub fn duplicate_mask(df: &DataFrame) -> Vec<bool> {
    let columns = df.get_columns();
    let mut seen = HashSet::with_capacity(df.height());
    (0..df.height())
        .map(|idx| !seen.insert(row_key(columns, idx)))
        .collect()
}

/// Value equality of two tables: same column names, dtypes and cells.
///
/// Unlike a plain dataframe comparison, missing cells (null or `NaN`) are
/// equal to each other.
pub fn tables_equal(left: &DataFrame, right: &DataFrame) -> bool {
    if left.shape() != right.shape() {
        return false;
    }
    let same_schema = left
        .get_columns()
        .iter()
        .zip(right.get_columns())
        .all(|(a, b)| a.name() == b.name() && a.dtype() == b.dtype());
    if !same_schema {
        return false;
    }
    let (left_columns, right_columns) = (left.get_columns(), right.get_columns());
    (0..left.height()).all(|idx| row_key(left_columns, idx) == row_key(right_columns, idx))
}

/// Differences between a dataset's original and working tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub before: TableStats,
    pub after: TableStats,
    pub identical: bool,
}

impl ChangeSummary {
    pub fn between(original: &DataFrame, working: &DataFrame) -> Self {
        Self {
            before: table_stats(original),
            after: table_stats(working),
            identical: tables_equal(original, working),
        }
    }

    /// Human-readable lines for each statistic that changed.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let pairs = [
            ("Rows", self.before.rows, self.after.rows),
            ("Columns", self.before.columns, self.after.columns),
            (
                "Missing values",
                self.before.missing_cells,
                self.after.missing_cells,
            ),
            (
                "Duplicates",
                self.before.duplicate_rows,
                self.after.duplicate_rows,
            ),
        ];
        for (label, before, after) in pairs {
            if before != after {
                let delta = after as i64 - before as i64;
                lines.push(format!("{label}: {before} → {after} ({delta:+})"));
            }
        }
        lines
    }
}
