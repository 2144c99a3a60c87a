//! Error types for export writers.

use sweep_model::{Compression, ExportFormat};
use thiserror::Error;

/// Errors that can occur while serializing a table for download.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Codec that is offered but not implemented.
    #[error("{} compression is not supported; use gzip or zip", .0.as_str())]
    UnsupportedCompression(Compression),

    /// Compression was requested for a format other than CSV.
    #[error("compression is only available for CSV exports, not {}", .0.as_str())]
    CompressionRequiresCsv(ExportFormat),

    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The table does not fit on one worksheet.
    #[error("{rows} rows x {columns} columns does not fit on an Excel worksheet")]
    SheetTooLarge { rows: usize, columns: usize },

    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ExportError::UnsupportedCompression(Compression::Xz).to_string(),
            "xz compression is not supported; use gzip or zip"
        );
        assert_eq!(
            ExportError::CompressionRequiresCsv(ExportFormat::Json).to_string(),
            "compression is only available for CSV exports, not json"
        );
    }
}
