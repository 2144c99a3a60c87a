//! Excel `.xlsx` export.
//!
//! One worksheet named `Sheet1`: a bold header row, then one row per table
//! row. Missing cells are left empty. Datetimes are written as date serials
//! with a date number format, so spreadsheet readers see them as dates.

use polars::prelude::{AnyValue, DataFrame};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use sweep_model::{
    any_to_string, datetime_to_millis, is_missing, millis_to_excel_serial, numeric_value,
};

use crate::cell;
use crate::error::{ExportError, Result};

const SHEET_NAME: &str = "Sheet1";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Rows per worksheet, header included.
pub const MAX_SHEET_ROWS: usize = 1_048_576;
/// Columns per worksheet.
pub const MAX_SHEET_COLUMNS: usize = 16_384;

/// Serializes the table as a single-sheet workbook.
pub fn write_xlsx(df: &DataFrame) -> Result<Vec<u8>> {
    if df.height() + 1 > MAX_SHEET_ROWS || df.width() > MAX_SHEET_COLUMNS {
        return Err(ExportError::SheetTooLarge {
            rows: df.height(),
            columns: df.width(),
        });
    }

    let header = Format::new().set_bold();
    let datetime = Format::new().set_num_format(DATETIME_FORMAT);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, column) in df.get_columns().iter().enumerate() {
        // Bounded by MAX_SHEET_COLUMNS / MAX_SHEET_ROWS above.
        let col = col as u16;
        sheet.write_string_with_format(0, col, column.name().as_str(), &header)?;
        for row in 0..df.height() {
            write_cell(sheet, row as u32 + 1, col, cell(column, row), &datetime)?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: AnyValue<'_>,
    datetime: &Format,
) -> Result<()> {
    if is_missing(&value) {
        return Ok(());
    }
    match value {
        AnyValue::Boolean(b) => {
            sheet.write_boolean(row, col, b)?;
        }
        AnyValue::Datetime(v, unit, _) => {
            let serial = millis_to_excel_serial(datetime_to_millis(v, unit));
            sheet.write_number_with_format(row, col, serial, datetime)?;
        }
        AnyValue::String(s) => {
            sheet.write_string(row, col, s)?;
        }
        other => match numeric_value(other.clone()) {
            Some(number) if number.is_finite() => {
                sheet.write_number(row, col, number)?;
            }
            Some(_) => {}
            None => {
                sheet.write_string(row, col, any_to_string(other))?;
            }
        },
    }
    Ok(())
}
