//! Column selections and export views.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use sweep_output::{ExportArtifact, ExportOptions, export_table};
use sweep_transform::filter_rows;

use crate::error::{Result, SessionError};
use crate::session::Session;

/// What to export from a dataset and how to serialize it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportRequest {
    /// Columns in output order; `None` uses the dataset's selection.
    pub columns: Option<Vec<String>>,
    /// Restricted boolean expression; rows where it is not true are left out.
    pub filter: Option<String>,
    #[serde(flatten)]
    pub options: ExportOptions,
}

impl Session {
    /// Stores the column selection used by previews and exports.
    pub fn set_selected_columns(&mut self, name: &str, columns: Vec<String>) -> Result<()> {
        let dataset = self.get_mut(name)?;
        let working = dataset.working();
        if let Some(missing) = columns
            .iter()
            .find(|column| working.column(column.as_str()).is_err())
        {
            return Err(SessionError::ColumnNotFound {
                dataset: name.to_string(),
                column: missing.clone(),
            });
        }
        tracing::debug!(dataset = name, columns = columns.len(), "selected columns");
        dataset.set_selection(Some(columns));
        Ok(())
    }

    /// Drops the stored selection so every column is selected again.
    pub fn clear_selected_columns(&mut self, name: &str) -> Result<()> {
        self.get_mut(name)?.set_selection(None);
        Ok(())
    }

    /// The effective selection: the stored list restricted to columns the
    /// working table still has, or every column when nothing is stored.
    ///
    /// Names that no longer exist are logged and pruned from the stored list.
    pub fn selected_columns(&mut self, name: &str) -> Result<Vec<String>> {
        let dataset = self.get_mut(name)?;
        let working = dataset.working();
        let Some(stored) = dataset.stored_selection() else {
            return Ok(working
                .get_column_names()
                .into_iter()
                .map(|column| column.to_string())
                .collect());
        };

        let (kept, dropped): (Vec<String>, Vec<String>) = stored
            .iter()
            .cloned()
            .partition(|column| working.column(column.as_str()).is_ok());
        if !dropped.is_empty() {
            tracing::warn!(
                dataset = name,
                dropped = ?dropped,
                "selected columns no longer exist in the working table"
            );
            dataset.set_selection(Some(kept.clone()));
        }
        Ok(kept)
    }

    /// Projects the working table for preview or export.
    ///
    /// `columns` overrides the stored selection and must all exist. The row
    /// filter sees the full working table, so it may reference columns that
    /// are not exported. The working table is not changed.
    pub fn export_view(
        &mut self,
        name: &str,
        columns: Option<&[String]>,
        row_filter: Option<&str>,
    ) -> Result<DataFrame> {
        let columns = match columns {
            Some(columns) => {
                let working = self.working(name)?;
                if let Some(missing) = columns
                    .iter()
                    .find(|column| working.column(column.as_str()).is_err())
                {
                    return Err(SessionError::ColumnNotFound {
                        dataset: name.to_string(),
                        column: missing.clone(),
                    });
                }
                columns.to_vec()
            }
            None => self.selected_columns(name)?,
        };
        if columns.is_empty() {
            return Err(SessionError::EmptySelection);
        }

        let working = self.working(name)?;
        let rows = match row_filter.map(str::trim).filter(|f| !f.is_empty()) {
            Some(filter) => filter_rows(working, filter)?,
            None => working.clone(),
        };
        let view = rows.select(columns.iter().map(String::as_str))?;
        tracing::debug!(
            dataset = name,
            rows = view.height(),
            columns = view.width(),
            "built export view"
        );
        Ok(view)
    }

    /// Builds the export view and serializes it.
    pub fn export(&mut self, name: &str, request: &ExportRequest) -> Result<ExportArtifact> {
        let view = self.export_view(name, request.columns.as_deref(), request.filter.as_deref())?;
        Ok(export_table(&view, name, &request.options)?)
    }
}
