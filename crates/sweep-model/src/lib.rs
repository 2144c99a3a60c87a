//! Shared vocabulary for the data sweeper workspace.
//!
//! The table type throughout the workspace is a Polars [`DataFrame`]; this
//! crate adds what the other crates agree on:
//!
//! - [`value`]: `AnyValue` conversion helpers and the [`Literal`] type
//! - [`types`]: closed option enums (formats, strategies, targets, methods)
//! - [`stats`]: table statistics, numeric summaries, duplicate detection and
//!   change summaries
//! - [`size`]: byte-size formatting for dataset listings
//!
//! [`DataFrame`]: polars::prelude::DataFrame

pub mod error;
pub mod size;
pub mod stats;
pub mod types;
pub mod value;

pub use error::{ModelError, Result};
pub use size::format_byte_size;
pub use stats::{
    ChangeSummary, ColumnSummary, NumericSummary, TableStats, column_missing_count,
    column_summaries, describe, duplicate_mask, missing_cell_count, quantile, row_key,
    sample_std, table_stats, tables_equal,
};
pub use types::{
    ArithmeticOp, Compression, ConversionTarget, DEFAULT_IQR_FACTOR, DEFAULT_ZSCORE_THRESHOLD,
    ExportFormat, FillStrategy, OutlierMethod, SourceFormat, TextOp,
};
pub use value::{
    EXCEL_EPOCH_OFFSET_DAYS, Literal, any_to_f64, any_to_string, any_to_text, column_f64_values,
    datetime_to_millis, excel_serial_to_millis, format_datetime_millis, format_numeric,
    is_integer_dtype, is_missing, is_numeric_dtype, is_text_dtype, millis_to_excel_serial,
    numeric_value, parse_f64,
};
