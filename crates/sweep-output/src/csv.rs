//! CSV export through the Polars writer.

use polars::prelude::*;
use sweep_model::column_f64_values;

use crate::error::Result;

/// Writes the table as comma-separated text with a header row.
///
/// Missing values, including float `NaN`, are written as empty fields.
pub fn write_csv(df: &DataFrame) -> Result<Vec<u8>> {
    let mut frame = nan_as_null(df)?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut frame)?;
    Ok(buffer)
}

fn nan_as_null(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();
    for column in df.get_columns() {
        if !matches!(column.dtype(), DataType::Float32 | DataType::Float64) {
            continue;
        }
        let values = column_f64_values(column);
        if values.iter().flatten().count() == column.len() - column.null_count() {
            continue;
        }
        out.with_column(Series::new(column.name().clone(), values))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_nan_are_empty_fields() {
        let df = DataFrame::new(vec![
            Series::new("id".into(), vec![1i64, 2]).into(),
            Series::new("price".into(), vec![Some(f64::NAN), Some(2.5)]).into(),
            Series::new("city".into(), vec![None, Some("Oslo")]).into(),
        ])
        .unwrap();
        let text = String::from_utf8(write_csv(&df).unwrap()).unwrap();
        assert_eq!(text, "id,price,city\n1,,\n2,2.5,Oslo\n");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let df = DataFrame::new(vec![Series::new("note".into(), vec!["a,b"]).into()]).unwrap();
        let text = String::from_utf8(write_csv(&df).unwrap()).unwrap();
        assert_eq!(text, "note\n\"a,b\"\n");
    }
}
