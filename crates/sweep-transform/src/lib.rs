//! Cleaning transforms for the data sweeper.
//!
//! Every transform is a pure function from a table (and parameters) to a new
//! table; the input is never modified, so a failed transform leaves the
//! caller's data untouched.
//!
//! - **ops**: one module per family (rows, fill, columns, convert, text,
//!   outliers)
//! - **transform**: the closed [`Transform`] enum used by sessions and recipe
//!   files
//! - **expr**: the restricted expression language behind derived columns and
//!   row filters

pub mod error;
pub mod expr;
pub mod frame;
pub mod ops;
pub mod transform;

pub use error::{ExpressionError, Result, TransformError};
pub use expr::{Expression, Value, values_to_column};
pub use ops::columns::{DeriveSource, derive_column, drop_columns, rename_column};
pub use ops::convert::{convert_type, parse_datetime, parse_target};
pub use ops::fill::{fill_custom, fill_numeric, mean, median};
pub use ops::outliers::{detect_outliers, remove_outliers};
pub use ops::rows::{dedup, drop_missing_rows, filter_rows};
pub use ops::text::{numbers_column_name, text_op};
pub use transform::Transform;
