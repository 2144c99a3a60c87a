//! Export writers for cleaned tables.
//!
//! [`export_table`] turns a table into an [`ExportArtifact`]: the bytes of
//! the requested format plus the download file name and MIME type.
//! Compression applies to CSV only.

pub mod compress;
pub mod csv;
pub mod error;
pub mod excel;
pub mod html;
pub mod json;
pub mod markdown;

use polars::prelude::{AnyValue, Column, DataFrame};
use serde::{Deserialize, Serialize};
use sweep_model::{Compression, ExportFormat};

pub use crate::compress::{compress, compressed_extension, compressed_mime_type};
pub use crate::csv::write_csv;
pub use crate::excel::write_xlsx;
pub use crate::html::write_html;
pub use crate::json::write_json;
pub use crate::markdown::write_markdown;
pub use error::{ExportError, Result};

/// How a table is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub compression: Option<Compression>,
    /// Adds a leading row-position column (HTML and Markdown only).
    pub include_index: bool,
}

/// A serialized export ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Download name for an export of `source_name`: the part before the first
/// `.` plus the format's extension.
pub fn export_file_name(
    source_name: &str,
    format: ExportFormat,
    compression: Option<Compression>,
) -> String {
    let stem = source_name.split('.').next().unwrap_or(source_name);
    let extension = match compression {
        Some(compression) => compressed_extension(compression),
        None => format.extension(),
    };
    format!("{stem}.{extension}")
}

/// Serializes `df` in the requested format without compression.
pub fn render(df: &DataFrame, format: ExportFormat, include_index: bool) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => write_csv(df),
        ExportFormat::Excel => write_xlsx(df),
        ExportFormat::Json => write_json(df),
        ExportFormat::Html => Ok(write_html(df, include_index).into_bytes()),
        ExportFormat::Markdown => Ok(write_markdown(df, include_index).into_bytes()),
    }
}

/// Serializes `df` for download as an export of `source_name`.
pub fn export_table(
    df: &DataFrame,
    source_name: &str,
    options: &ExportOptions,
) -> Result<ExportArtifact> {
    if let Some(compression) = options.compression {
        if options.format != ExportFormat::Csv {
            return Err(ExportError::CompressionRequiresCsv(options.format));
        }
        if matches!(compression, Compression::Bz2 | Compression::Xz) {
            return Err(ExportError::UnsupportedCompression(compression));
        }
    }

    let mut bytes = render(df, options.format, options.include_index)?;
    let mut mime_type = options.format.mime_type();
    if let Some(compression) = options.compression {
        let entry_name = export_file_name(source_name, options.format, None);
        bytes = compress(&bytes, compression, &entry_name)?;
        mime_type = compressed_mime_type(compression);
    }

    let file_name = export_file_name(source_name, options.format, options.compression);
    tracing::info!(
        file = %file_name,
        format = options.format.as_str(),
        rows = df.height(),
        columns = df.width(),
        bytes = bytes.len(),
        "exported table"
    );
    Ok(ExportArtifact {
        file_name,
        mime_type,
        bytes,
    })
}

/// Reads one cell; out-of-range reads are missing.
pub(crate) fn cell(column: &Column, idx: usize) -> AnyValue<'_> {
    column.get(idx).unwrap_or(AnyValue::Null)
}
