//! The closed set of transforms and their dispatch.

use std::fmt;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use sweep_model::{ConversionTarget, FillStrategy, Literal, OutlierMethod, TextOp};

use crate::error::Result;
use crate::ops::columns::{DeriveSource, derive_column, drop_columns, rename_column};
use crate::ops::convert::convert_type;
use crate::ops::fill::{fill_custom, fill_numeric};
use crate::ops::outliers::remove_outliers;
use crate::ops::rows::{dedup, drop_missing_rows, filter_rows};
use crate::ops::text::text_op;

/// A parameterized cleaning step.
///
/// Serialized with an `op` tag so recipe files can list steps:
///
/// ```toml
/// [[steps]]
/// op = "fill-numeric"
/// strategy = "median"
///
/// [[steps]]
/// op = "outlier-remove"
/// column = "price"
/// method = "iqr"
/// factor = 1.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Transform {
    Dedup,
    DropMissingRows,
    FillNumeric {
        strategy: FillStrategy,
    },
    FillCustom {
        column: String,
        value: Literal,
    },
    RenameColumn {
        old: String,
        new: String,
    },
    DropColumns {
        columns: Vec<String>,
    },
    DeriveColumn {
        name: String,
        source: DeriveSource,
    },
    ConvertType {
        column: String,
        target: ConversionTarget,
    },
    TextOp {
        column: String,
        ops: Vec<TextOp>,
    },
    OutlierRemove {
        column: String,
        #[serde(flatten)]
        method: OutlierMethod,
    },
    FilterRows {
        expression: String,
    },
}

impl Transform {
    /// Runs the transform, returning a new table.
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        match self {
            Transform::Dedup => dedup(df),
            Transform::DropMissingRows => drop_missing_rows(df),
            Transform::FillNumeric { strategy } => fill_numeric(df, *strategy),
            Transform::FillCustom { column, value } => fill_custom(df, column, value),
            Transform::RenameColumn { old, new } => rename_column(df, old, new),
            Transform::DropColumns { columns } => drop_columns(df, columns),
            Transform::DeriveColumn { name, source } => derive_column(df, name, source),
            Transform::ConvertType { column, target } => convert_type(df, column, *target),
            Transform::TextOp { column, ops } => text_op(df, column, ops),
            Transform::OutlierRemove { column, method } => remove_outliers(df, column, method),
            Transform::FilterRows { expression } => filter_rows(df, expression),
        }
    }

    /// The `op` tag of this transform.
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Dedup => "dedup",
            Transform::DropMissingRows => "drop-missing-rows",
            Transform::FillNumeric { .. } => "fill-numeric",
            Transform::FillCustom { .. } => "fill-custom",
            Transform::RenameColumn { .. } => "rename-column",
            Transform::DropColumns { .. } => "drop-columns",
            Transform::DeriveColumn { .. } => "derive-column",
            Transform::ConvertType { .. } => "convert-type",
            Transform::TextOp { .. } => "text-op",
            Transform::OutlierRemove { .. } => "outlier-remove",
            Transform::FilterRows { .. } => "filter-rows",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Dedup | Transform::DropMissingRows => f.write_str(self.name()),
            Transform::FillNumeric { strategy } => write!(f, "fill-numeric({strategy})"),
            Transform::FillCustom { column, .. } => write!(f, "fill-custom({column})"),
            Transform::RenameColumn { old, new } => write!(f, "rename-column({old} -> {new})"),
            Transform::DropColumns { columns } => {
                write!(f, "drop-columns({})", columns.join(", "))
            }
            Transform::DeriveColumn { name, source } => {
                write!(f, "derive-column({name} = {source})")
            }
            Transform::ConvertType { column, target } => {
                write!(f, "convert-type({column} -> {target})")
            }
            Transform::TextOp { column, ops } => {
                let ops: Vec<&str> = ops.iter().map(|op| op.as_str()).collect();
                write!(f, "text-op({column}: {})", ops.join(", "))
            }
            Transform::OutlierRemove { column, method } => {
                write!(f, "outlier-remove({column}, {method})")
            }
            Transform::FilterRows { expression } => write!(f, "filter-rows({expression})"),
        }
    }
}
