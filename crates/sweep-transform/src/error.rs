//! Error types for transforms and expressions.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors from compiling or evaluating a restricted expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("expression is empty")]
    Empty,

    #[error("expression is too complex: {0}")]
    TooComplex(String),

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated {what} starting at offset {offset}")]
    Unterminated { what: &'static str, offset: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("type mismatch: cannot apply '{op}' to {operands}")]
    TypeMismatch { op: &'static str, operands: String },

    #[error("filter expression must produce true or false, got {0}")]
    NotBoolean(&'static str),
}

/// Errors raised by transforms. The input table is never modified.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("column '{0}' already exists")]
    ColumnExists(String),

    #[error("column '{column}' is not numeric (dtype {dtype})")]
    NotNumeric { column: String, dtype: String },

    #[error("column '{column}' is not text (dtype {dtype})")]
    NotText { column: String, dtype: String },

    #[error("unsupported conversion target '{0}'")]
    UnsupportedTarget(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
