//! Outlier detection and removal for numeric columns.

use polars::prelude::DataFrame;
use sweep_model::{OutlierMethod, column_f64_values, quantile, sample_std};

use crate::error::{Result, TransformError};
use crate::frame::{filter_by_mask, require_numeric};

fn validate(method: &OutlierMethod) -> Result<()> {
    match *method {
        OutlierMethod::ZScore { threshold } if !(threshold.is_finite() && threshold > 0.0) => {
            Err(TransformError::InvalidParameter(format!(
                "z-score threshold must be positive, got {threshold}"
            )))
        }
        OutlierMethod::Iqr { factor } if !(factor.is_finite() && factor >= 0.0) => {
            Err(TransformError::InvalidParameter(format!(
                "IQR factor must not be negative, got {factor}"
            )))
        }
        _ => Ok(()),
    }
}

/// Returns the sorted row indices flagged as outliers in `column`.
///
/// Missing values are never flagged. A z-score test over a column with zero
/// or undefined deviation flags nothing.
pub fn detect_outliers(
    df: &DataFrame,
    column: &str,
    method: &OutlierMethod,
) -> Result<Vec<usize>> {
    validate(method)?;
    let values = column_f64_values(require_numeric(df, column)?);
    let present: Vec<f64> = values.iter().flatten().copied().collect();

    let is_outlier: Box<dyn Fn(f64) -> bool> = match *method {
        OutlierMethod::ZScore { threshold } => {
            let mean = present.iter().sum::<f64>() / present.len().max(1) as f64;
            match sample_std(&present, mean) {
                Some(sd) if sd > 0.0 && sd.is_finite() => {
                    Box::new(move |x| ((x - mean) / sd).abs() > threshold)
                }
                _ => return Ok(Vec::new()),
            }
        }
        OutlierMethod::Iqr { factor } => {
            let mut sorted = present.clone();
            sorted.sort_by(f64::total_cmp);
            let (Some(q1), Some(q3)) = (quantile(&sorted, 0.25), quantile(&sorted, 0.75)) else {
                return Ok(Vec::new());
            };
            let iqr = q3 - q1;
            let (lower, upper) = (q1 - factor * iqr, q3 + factor * iqr);
            Box::new(move |x| x < lower || x > upper)
        }
    };

    let flagged: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| value.filter(|x| is_outlier(*x)).map(|_| idx))
        .collect();
    tracing::debug!(column, %method, flagged = flagged.len(), "outlier detection");
    Ok(flagged)
}

/// Removes exactly the rows [`detect_outliers`] flags.
pub fn remove_outliers(
    df: &DataFrame,
    column: &str,
    method: &OutlierMethod,
) -> Result<DataFrame> {
    let flagged = detect_outliers(df, column, method)?;
    if flagged.is_empty() {
        return Ok(df.clone());
    }
    let mut keep = vec![true; df.height()];
    for idx in flagged {
        keep[idx] = false;
    }
    filter_by_mask(df, &keep)
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;

    fn values(data: &[Option<f64>]) -> DataFrame {
        DataFrame::new(vec![Series::new("x".into(), data.to_vec()).into()]).unwrap()
    }

    #[test]
    fn iqr_flags_far_value() {
        let df = values(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(100.0)]);
        assert_eq!(
            detect_outliers(&df, "x", &OutlierMethod::iqr(1.5)).unwrap(),
            vec![4]
        );
    }

    #[test]
    fn zscore_uses_sample_deviation() {
        let mut data: Vec<Option<f64>> = vec![Some(10.0); 10];
        data.push(Some(50.0));
        data.push(None);
        let df = values(&data);
        assert_eq!(
            detect_outliers(&df, "x", &OutlierMethod::zscore(3.0)).unwrap(),
            vec![10]
        );
    }

    #[test]
    fn constant_column_flags_nothing() {
        let df = values(&[Some(5.0), Some(5.0), Some(5.0)]);
        assert!(
            detect_outliers(&df, "x", &OutlierMethod::zscore(1.0))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn remove_drops_flagged_rows_only() {
        let df = values(&[Some(1.0), None, Some(2.0), Some(3.0), Some(4.0), Some(100.0)]);
        let out = remove_outliers(&df, "x", &OutlierMethod::iqr(1.5)).unwrap();
        assert_eq!(out.height(), 5);
        assert_eq!(out.column("x").unwrap().null_count(), 1);
    }

    #[test]
    fn negative_factor_is_invalid() {
        let df = values(&[Some(1.0)]);
        assert!(matches!(
            detect_outliers(&df, "x", &OutlierMethod::iqr(-1.0)),
            Err(TransformError::InvalidParameter(_))
        ));
    }
}
