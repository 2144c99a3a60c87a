use polars::prelude::DataFrame;
use sweep_model::{ChangeSummary, SourceFormat, TableStats, format_byte_size, table_stats};

/// A named upload: the table as parsed and the table as cleaned so far.
///
/// `original` is fixed at load time. Transforms replace `working` as a
/// whole; Polars clones share column buffers, so both tables start out as
/// the same data.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    original: DataFrame,
    working: DataFrame,
    byte_size: u64,
    format: SourceFormat,
    selected_columns: Option<Vec<String>>,
}

impl Dataset {
    pub fn new(
        name: impl Into<String>,
        table: DataFrame,
        byte_size: u64,
        format: SourceFormat,
    ) -> Self {
        Self {
            name: name.into(),
            working: table.clone(),
            original: table,
            byte_size,
            format,
            selected_columns: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original(&self) -> &DataFrame {
        &self.original
    }

    pub fn working(&self) -> &DataFrame {
        &self.working
    }

    /// Size of the uploaded bytes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Upload size formatted for listings, e.g. `1.50 KB`.
    pub fn size_label(&self) -> String {
        format_byte_size(self.byte_size)
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// The stored column selection, as last set or pruned.
    pub fn stored_selection(&self) -> Option<&[String]> {
        self.selected_columns.as_deref()
    }

    pub fn stats(&self) -> TableStats {
        table_stats(&self.working)
    }

    pub fn changes(&self) -> ChangeSummary {
        ChangeSummary::between(&self.original, &self.working)
    }

    pub(crate) fn replace_working(&mut self, table: DataFrame) {
        self.working = table;
    }

    pub(crate) fn reset(&mut self) {
        self.working = self.original.clone();
    }

    pub(crate) fn set_selection(&mut self, columns: Option<Vec<String>>) {
        self.selected_columns = columns;
    }
}
