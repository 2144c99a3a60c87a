//! Row-removing transforms: deduplication, missing-row removal, filters.

use polars::prelude::DataFrame;
use sweep_model::{duplicate_mask, is_missing};

use crate::error::Result;
use crate::expr::Expression;
use crate::frame::{cell, filter_by_mask};

/// Removes rows that equal an earlier row in every column.
///
/// The first occurrence is kept and row order is preserved. Missing cells
/// compare equal to each other.
pub fn dedup(df: &DataFrame) -> Result<DataFrame> {
    let keep: Vec<bool> = duplicate_mask(df).into_iter().map(|dup| !dup).collect();
    filter_by_mask(df, &keep)
}

/// Removes rows with a missing value in any column.
pub fn drop_missing_rows(df: &DataFrame) -> Result<DataFrame> {
    let columns = df.get_columns();
    let keep: Vec<bool> = (0..df.height())
        .map(|idx| !columns.iter().any(|column| is_missing(&cell(column, idx))))
        .collect();
    filter_by_mask(df, &keep)
}

/// Keeps rows where a boolean expression is true. Missing results drop the
/// row.
pub fn filter_rows(df: &DataFrame, expression: &str) -> Result<DataFrame> {
    let expression = Expression::compile(expression, df)?;
    let keep = expression.evaluate_mask(df)?;
    filter_by_mask(df, &keep)
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;

    fn orders() -> DataFrame {
        DataFrame::new(vec![
            Series::new("id".into(), vec![1i64, 1, 2]).into(),
            Series::new("v".into(), vec![5i64, 5, 3]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let out = dedup(&orders()).unwrap();
        assert_eq!(out.height(), 2);
        let ids = out.column("id").unwrap().i64().unwrap();
        assert_eq!(ids.get(0), Some(1));
        assert_eq!(ids.get(1), Some(2));
    }

    #[test]
    fn drop_missing_removes_nan_rows() {
        let df = DataFrame::new(vec![
            Series::new("a".into(), vec![Some(1.0), Some(f64::NAN), Some(3.0)]).into(),
            Series::new("b".into(), vec![Some("x"), Some("y"), None]).into(),
        ])
        .unwrap();
        let out = drop_missing_rows(&df).unwrap();
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn filter_rows_by_expression() {
        let out = filter_rows(&orders(), "v > 4").unwrap();
        assert_eq!(out.height(), 2);
        assert!(filter_rows(&orders(), "missing > 4").is_err());
    }
}
