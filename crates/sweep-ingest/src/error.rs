//! Error types for upload parsing.

use thiserror::Error;

/// Errors that can occur while turning uploaded bytes into a table.
#[derive(Debug, Error)]
pub enum ParseError {
    // === Input Errors ===
    /// Upload contains no bytes.
    #[error("{name} is empty")]
    Empty { name: String },

    /// Upload exceeds the size limit.
    #[error("{name} is {size} bytes, larger than the {max_size} byte limit")]
    TooLarge {
        name: String,
        size: u64,
        max_size: u64,
    },

    /// Upload is not UTF-8 text.
    #[error("{name} uses an unsupported encoding ({encoding}); save it as UTF-8")]
    UnsupportedEncoding {
        name: String,
        encoding: &'static str,
    },

    /// File extension that is not a known upload format.
    #[error("{name}: unsupported file format '{format}'")]
    UnsupportedFormat { name: String, format: String },

    // === Header Errors ===
    /// No header row could be read.
    #[error("{name} has no header row")]
    NoHeader { name: String },

    /// A header cell is blank.
    #[error("{name}: column {index} has an empty name")]
    EmptyColumnName { name: String, index: usize },

    /// Two header cells share a name.
    #[error("{name}: duplicate column name '{column}'")]
    DuplicateColumn { name: String, column: String },

    // === Content Errors ===
    /// Malformed CSV content.
    #[error("failed to parse CSV {name}: {message}")]
    Csv { name: String, message: String },

    /// The workbook container or its parts could not be read.
    #[error("failed to read workbook {name}: {message}")]
    Workbook { name: String, message: String },

    /// The first worksheet could not be read.
    #[error("{name}: sheet '{sheet}' is unreadable: {message}")]
    Sheet {
        name: String,
        sheet: String,
        message: String,
    },
}

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::DuplicateColumn {
            name: "sales.csv".to_string(),
            column: "price".to_string(),
        };
        assert_eq!(err.to_string(), "sales.csv: duplicate column name 'price'");
    }
}
