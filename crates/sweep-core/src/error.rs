//! Session error types.

use sweep_ingest::ParseError;
use sweep_output::ExportError;
use sweep_transform::TransformError;
use thiserror::Error;

/// Errors returned by [`Session`](crate::Session) operations.
///
/// A failed operation never changes the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("dataset '{0}' not found")]
    DatasetNotFound(String),

    #[error("dataset '{dataset}' has no column '{column}'")]
    ColumnNotFound { dataset: String, column: String },

    #[error("no dataset is loaded")]
    NoCurrentDataset,

    #[error("no columns selected for export")]
    EmptySelection,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
