//! Text normalization for string columns.

use std::sync::LazyLock;

use polars::prelude::*;
use regex::Regex;
use sweep_model::{TextOp, any_to_text};

use crate::error::Result;
use crate::frame::{cell, require_text};

/// Anything that is neither a word character nor whitespace.
static SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("Invalid special character regex"));

/// First run of digits.
static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("Invalid digit regex"));

/// Name of the column that `extract-numbers` writes for `column`.
pub fn numbers_column_name(column: &str) -> String {
    format!("{column}_numbers")
}

/// Applies text operations to a string column, cumulatively and in order.
///
/// `extract-numbers` does not change the column itself: it adds (or
/// replaces) `<column>_numbers` holding the first run of digits of the
/// value at that point, or missing when there is none.
pub fn text_op(df: &DataFrame, column: &str, ops: &[TextOp]) -> Result<DataFrame> {
    let source = require_text(df, column)?;
    let mut values: Vec<Option<String>> = (0..source.len())
        .map(|idx| any_to_text(cell(source, idx)))
        .collect();
    let mut numbers: Option<Vec<Option<String>>> = None;

    for op in ops {
        match op {
            TextOp::Lowercase => map_present(&mut values, |s| s.to_lowercase()),
            TextOp::Uppercase => map_present(&mut values, |s| s.to_uppercase()),
            TextOp::Trim => map_present(&mut values, |s| s.trim().to_string()),
            TextOp::StripSpecialChars => {
                map_present(&mut values, |s| SPECIAL_CHARS.replace_all(s, "").into_owned());
            }
            TextOp::ExtractNumbers => {
                numbers = Some(
                    values
                        .iter()
                        .map(|value| {
                            value
                                .as_deref()
                                .and_then(|s| DIGITS.find(s))
                                .map(|m| m.as_str().to_string())
                        })
                        .collect(),
                );
            }
        }
    }

    let mut out = df.clone();
    out.with_column(Series::new(source.name().clone(), values))?;
    if let Some(numbers) = numbers {
        let name = numbers_column_name(column);
        out.with_column(Series::new(name.as_str().into(), numbers))?;
    }
    tracing::debug!(column, ops = ops.len(), "applied text operations");
    Ok(out)
}

fn map_present(values: &mut [Option<String>], f: impl Fn(&str) -> String) {
    for value in values.iter_mut().flatten() {
        *value = f(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new(
                "code".into(),
                vec![Some("  Ab-12 cd!  "), None, Some("no digits")],
            )
            .into(),
            Series::new("n".into(), vec![1i64, 2, 3]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn ops_apply_in_order() {
        let out = text_op(
            &frame(),
            "code",
            &[TextOp::Trim, TextOp::StripSpecialChars, TextOp::Uppercase],
        )
        .unwrap();
        let code = out.column("code").unwrap().str().unwrap();
        assert_eq!(code.get(0), Some("AB12 CD"));
        assert_eq!(code.get(1), None);
    }

    #[test]
    fn extract_numbers_adds_column() {
        let out = text_op(&frame(), "code", &[TextOp::ExtractNumbers]).unwrap();
        assert_eq!(out.width(), 3);
        let numbers = out.column("code_numbers").unwrap().str().unwrap();
        assert_eq!(numbers.get(0), Some("12"));
        assert_eq!(numbers.get(1), None);
        assert_eq!(numbers.get(2), None);
        let code = out.column("code").unwrap().str().unwrap();
        assert_eq!(code.get(0), Some("  Ab-12 cd!  "));
    }

    #[test]
    fn numeric_column_is_rejected() {
        assert!(matches!(
            text_op(&frame(), "n", &[TextOp::Lowercase]),
            Err(TransformError::NotText { .. })
        ));
    }
}
