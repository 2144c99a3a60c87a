//! Upload parsing for the data sweeper.
//!
//! Turns uploaded bytes into a Polars [`DataFrame`]:
//!
//! - **CSV**: UTF-8 text with a header row, types inferred by Polars.
//! - **Excel** (`.xlsx` and legacy `.xls`): the first worksheet, header in
//!   the first used row.

pub mod csv;
pub mod error;
pub mod excel;

use polars::prelude::DataFrame;
use sweep_model::SourceFormat;

pub use crate::csv::{decode_utf8, read_csv_bytes};
pub use error::{ParseError, Result};
pub use excel::read_excel_bytes;

/// Maximum upload size (500 MiB).
pub const MAX_UPLOAD_SIZE: u64 = 500 * 1024 * 1024;

/// Tables wider than this are accepted with a warning.
const WIDE_TABLE_COLUMNS: usize = 500;

/// Parses uploaded bytes into a table.
pub fn parse_table(name: &str, bytes: &[u8], format: SourceFormat) -> Result<DataFrame> {
    parse_table_with_limit(name, bytes, format, MAX_UPLOAD_SIZE)
}

/// Parses uploaded bytes, rejecting uploads larger than `max_size`.
pub fn parse_table_with_limit(
    name: &str,
    bytes: &[u8],
    format: SourceFormat,
    max_size: u64,
) -> Result<DataFrame> {
    let size = bytes.len() as u64;
    if size > max_size {
        return Err(ParseError::TooLarge {
            name: name.to_string(),
            size,
            max_size,
        });
    }

    let df = match format {
        SourceFormat::Csv => read_csv_bytes(name, bytes)?,
        SourceFormat::Xlsx | SourceFormat::Xls => read_excel_bytes(name, bytes)?,
    };

    if df.width() > WIDE_TABLE_COLUMNS {
        tracing::warn!(
            name,
            columns = df.width(),
            "table has more than {WIDE_TABLE_COLUMNS} columns"
        );
    }
    tracing::info!(
        name,
        format = format.as_str(),
        rows = df.height(),
        columns = df.width(),
        "parsed upload"
    );
    Ok(df)
}
