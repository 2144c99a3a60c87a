//! Excel workbook parsing (`.xlsx` and legacy `.xls`).
//!
//! Workbooks are opened with calamine, which detects the container from the
//! bytes rather than the file name. Only the first worksheet is read. Its
//! first used row is the header; every row below it down to the last used
//! row is kept, blank rows included.

use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use polars::prelude::*;
use sweep_model::{excel_serial_to_millis, format_datetime_millis, format_numeric};

use crate::csv::validate_headers;
use crate::error::{ParseError, Result};

/// Largest integer a spreadsheet number can carry exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A non-blank cell value.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Number(f64),
    Text(String),
    Bool(bool),
    /// Epoch milliseconds of a date-formatted cell.
    DateTime(i64),
}

impl Cell {
    fn from_data(data: &Data) -> Option<Self> {
        match data {
            Data::Int(v) => Some(Cell::Number(*v as f64)),
            Data::Float(v) if v.is_finite() => Some(Cell::Number(*v)),
            Data::String(s) if s.is_empty() => None,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                Some(Cell::Text(s.clone()))
            }
            Data::Bool(b) => Some(Cell::Bool(*b)),
            Data::DateTime(dt) => Some(Cell::DateTime(excel_serial_to_millis(dt.as_f64()))),
            // Error cells (#DIV/0!, #N/A) and empty cells are missing.
            _ => None,
        }
    }

    fn into_text(self) -> String {
        match self {
            Cell::Number(v) => format_numeric(v),
            Cell::Text(s) => s,
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(millis) => {
                format_datetime_millis(millis, "%Y-%m-%d %H:%M:%S").unwrap_or_default()
            }
        }
    }
}

/// Parses the first worksheet of an `.xlsx` or `.xls` workbook into a DataFrame.
pub fn read_excel_bytes(name: &str, bytes: &[u8]) -> Result<DataFrame> {
    let workbook_error = |message: String| ParseError::Workbook {
        name: name.to_string(),
        message,
    };
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| workbook_error(e.to_string()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .unwrap_or_else(|| "Sheet1".to_string());
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| workbook_error("workbook contains no sheets".to_string()))?
        .map_err(|e| ParseError::Sheet {
            name: name.to_string(),
            sheet: sheet.clone(),
            message: e.to_string(),
        })?;

    let df = range_to_frame(name, &range)?;
    tracing::debug!(
        name,
        sheet = %sheet,
        rows = df.height(),
        columns = df.width(),
        "parsed worksheet"
    );
    Ok(df)
}

/// Builds a DataFrame from a sheet range, using its first row as the header.
///
/// Header width ends at the last non-blank header cell; data to the right of
/// it is ignored.
fn range_to_frame(name: &str, range: &Range<Data>) -> Result<DataFrame> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(ParseError::NoHeader {
            name: name.to_string(),
        });
    };
    let header_cells: Vec<Option<Cell>> = header_row.iter().map(Cell::from_data).collect();
    let width = header_cells
        .iter()
        .rposition(Option::is_some)
        .map_or(0, |last| last + 1);
    let header_texts: Vec<String> = header_cells
        .into_iter()
        .take(width)
        .map(|cell| cell.map(Cell::into_text).unwrap_or_default())
        .collect();
    let headers = validate_headers(name, header_texts.iter().map(String::as_str))?;

    let body: Vec<&[Data]> = rows.collect();
    let columns = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let cells = body
                .iter()
                .map(|row| row.get(idx).and_then(Cell::from_data))
                .collect();
            build_column(header, cells)
        })
        .collect::<PolarsResult<Vec<Column>>>()
        .and_then(DataFrame::new);
    columns.map_err(|e| ParseError::Workbook {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Chooses the narrowest dtype that holds every non-blank cell.
fn build_column(header: &str, cells: Vec<Option<Cell>>) -> PolarsResult<Column> {
    let present = || cells.iter().flatten();
    let any_present = present().next().is_some();
    if !any_present {
        let texts: Vec<Option<String>> = vec![None; cells.len()];
        return Ok(Series::new(header.into(), texts).into());
    }

    if present().all(|c| matches!(c, Cell::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .into_iter()
            .map(|c| match c {
                Some(Cell::Bool(b)) => Some(b),
                _ => None,
            })
            .collect();
        return Ok(Series::new(header.into(), values).into());
    }
    if present().all(|c| matches!(c, Cell::DateTime(_))) {
        let millis: Vec<Option<i64>> = cells
            .into_iter()
            .map(|c| match c {
                Some(Cell::DateTime(m)) => Some(m),
                _ => None,
            })
            .collect();
        let series = Series::new(header.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
        return Ok(series.into());
    }
    if present().all(|c| matches!(c, Cell::Number(_))) {
        let numbers: Vec<Option<f64>> = cells
            .into_iter()
            .map(|c| match c {
                Some(Cell::Number(v)) => Some(v),
                _ => None,
            })
            .collect();
        let integral = numbers
            .iter()
            .flatten()
            .all(|v| v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER);
        if integral {
            let ints: Vec<Option<i64>> = numbers.iter().map(|v| v.map(|v| v as i64)).collect();
            return Ok(Series::new(header.into(), ints).into());
        }
        return Ok(Series::new(header.into(), numbers).into());
    }
    let texts: Vec<Option<String>> = cells.into_iter().map(|c| c.map(Cell::into_text)).collect();
    Ok(Series::new(header.into(), texts).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[Data]]) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), value.clone());
            }
        }
        range
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn test_cell_types() {
        assert_eq!(Cell::from_data(&Data::Float(1.5)), Some(Cell::Number(1.5)));
        assert_eq!(Cell::from_data(&Data::Int(3)), Some(Cell::Number(3.0)));
        assert_eq!(Cell::from_data(&Data::Bool(true)), Some(Cell::Bool(true)));
        assert_eq!(Cell::from_data(&text("")), None);
        assert_eq!(Cell::from_data(&Data::Empty), None);
        assert_eq!(Cell::from_data(&text("a & b")), Some(Cell::Text("a & b".into())));
    }

    #[test]
    fn test_blank_interior_rows_are_kept() {
        let range = sheet(&[
            &[text("a"), text("b")],
            &[Data::Float(1.0), text("x")],
            &[Data::Empty, Data::Empty],
            &[Data::Float(3.0), text("z")],
        ]);
        let df = range_to_frame("t.xlsx", &range).unwrap();
        assert_eq!(df.shape(), (3, 2));
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("a").unwrap().null_count(), 1);
        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_header_stops_at_last_named_cell() {
        let range = sheet(&[
            &[text("id"), Data::Empty],
            &[Data::Float(1.0), text("stray")],
        ]);
        let df = range_to_frame("t.xlsx", &range).unwrap();
        assert_eq!(df.width(), 1);
    }

    #[test]
    fn test_blank_header_cell_is_rejected() {
        let range = sheet(&[&[Data::Empty, text("b")], &[Data::Float(1.0), text("x")]]);
        assert!(matches!(
            range_to_frame("t.xlsx", &range),
            Err(ParseError::EmptyColumnName { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_sheet_has_no_header() {
        let range: Range<Data> = Range::empty();
        assert!(matches!(
            range_to_frame("t.xlsx", &range),
            Err(ParseError::NoHeader { .. })
        ));
    }

    #[test]
    fn test_build_column_dtypes() {
        let ints = build_column("a", vec![Some(Cell::Number(1.0)), None]).unwrap();
        assert_eq!(ints.dtype(), &DataType::Int64);
        let floats = build_column("b", vec![Some(Cell::Number(1.5))]).unwrap();
        assert_eq!(floats.dtype(), &DataType::Float64);
        let mixed = build_column(
            "c",
            vec![Some(Cell::Number(1.0)), Some(Cell::Text("x".into()))],
        )
        .unwrap();
        assert_eq!(mixed.dtype(), &DataType::String);
        let blank = build_column("d", vec![None, None]).unwrap();
        assert_eq!(blank.dtype(), &DataType::String);
        let dates = build_column("e", vec![Some(Cell::DateTime(0)), None]).unwrap();
        assert_eq!(
            dates.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
    }
}
