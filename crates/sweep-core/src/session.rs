//! The tabular store: datasets by name and the current-dataset pointer.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use sweep_ingest::{ParseError, parse_table};
use sweep_model::{ChangeSummary, OutlierMethod, SourceFormat, TableStats};
use sweep_transform::{Transform, detect_outliers};

use crate::dataset::Dataset;
use crate::error::{Result, SessionError};

/// Every dataset loaded in one session.
///
/// Mutating operations build the complete new table first and only then
/// commit it, so an error leaves the session exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct Session {
    datasets: BTreeMap<String, Dataset>,
    current: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `bytes` and stores the result under `name`, replacing any
    /// dataset already stored under that name.
    ///
    /// The first dataset loaded into an empty session becomes current.
    pub fn load(&mut self, name: &str, bytes: &[u8], format: SourceFormat) -> Result<&Dataset> {
        let table = parse_table(name, bytes, format)?;
        Ok(self.insert(Dataset::new(name, table, bytes.len() as u64, format)))
    }

    /// Like [`Session::load`], detecting the format from the file extension.
    pub fn load_file(&mut self, name: &str, bytes: &[u8]) -> Result<&Dataset> {
        let format = SourceFormat::from_file_name(name).ok_or_else(|| {
            ParseError::UnsupportedFormat {
                name: name.to_string(),
                format: name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("").to_string(),
            }
        })?;
        self.load(name, bytes, format)
    }

    /// Stores an already parsed dataset.
    pub fn insert(&mut self, dataset: Dataset) -> &Dataset {
        let name = dataset.name().to_string();
        let replaced = self.datasets.insert(name.clone(), dataset).is_some();
        if self.current.is_none() {
            self.current = Some(name.clone());
        }
        let dataset = &self.datasets[&name];
        tracing::info!(
            dataset = %name,
            rows = dataset.working().height(),
            columns = dataset.working().width(),
            size = %dataset.size_label(),
            replaced,
            "loaded dataset"
        );
        dataset
    }

    pub fn get(&self, name: &str) -> Result<&Dataset> {
        self.datasets
            .get(name)
            .ok_or_else(|| SessionError::DatasetNotFound(name.to_string()))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Result<&mut Dataset> {
        self.datasets
            .get_mut(name)
            .ok_or_else(|| SessionError::DatasetNotFound(name.to_string()))
    }

    /// Deletes a dataset. When it was current, the first remaining dataset
    /// by name becomes current.
    pub fn remove(&mut self, name: &str) -> Result<Dataset> {
        let dataset = self
            .datasets
            .remove(name)
            .ok_or_else(|| SessionError::DatasetNotFound(name.to_string()))?;
        if self.current.as_deref() == Some(name) {
            self.current = self.datasets.keys().next().cloned();
        }
        tracing::info!(dataset = name, current = ?self.current, "removed dataset");
        Ok(dataset)
    }

    /// Restores the working table to the table as loaded.
    pub fn reset(&mut self, name: &str) -> Result<()> {
        self.get_mut(name)?.reset();
        tracing::info!(dataset = name, "reset working table");
        Ok(())
    }

    pub fn set_current(&mut self, name: &str) -> Result<()> {
        self.get(name)?;
        self.current = Some(name.to_string());
        Ok(())
    }

    pub fn current(&self) -> Option<&Dataset> {
        self.current
            .as_deref()
            .and_then(|name| self.datasets.get(name))
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Dataset names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.datasets.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.values()
    }

    /// Runs a transform against the working table and commits the result
    /// only if it succeeds.
    pub fn apply(&mut self, name: &str, transform: &Transform) -> Result<&Dataset> {
        let dataset = self.get_mut(name)?;
        let before = dataset.working().shape();
        let table = transform.apply(dataset.working())?;
        tracing::info!(
            dataset = name,
            transform = transform.name(),
            rows_before = before.0,
            rows = table.height(),
            columns_before = before.1,
            columns = table.width(),
            "applied transform"
        );
        tracing::debug!(dataset = name, %transform, "transform parameters");
        dataset.replace_working(table);
        Ok(dataset)
    }

    /// [`Session::apply`] on the current dataset.
    pub fn apply_current(&mut self, transform: &Transform) -> Result<&Dataset> {
        let name = self
            .current
            .clone()
            .ok_or(SessionError::NoCurrentDataset)?;
        self.apply(&name, transform)
    }

    /// Row indices of the working table flagged as outliers. Read-only.
    pub fn detect_outliers(
        &self,
        name: &str,
        column: &str,
        method: &OutlierMethod,
    ) -> Result<Vec<usize>> {
        Ok(detect_outliers(self.get(name)?.working(), column, method)?)
    }

    pub fn stats(&self, name: &str) -> Result<TableStats> {
        Ok(self.get(name)?.stats())
    }

    /// Original-versus-working summary for a dataset.
    pub fn changes(&self, name: &str) -> Result<ChangeSummary> {
        Ok(self.get(name)?.changes())
    }

    pub(crate) fn working(&self, name: &str) -> Result<&DataFrame> {
        Ok(self.get(name)?.working())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep_model::tables_equal;

    const SALES: &[u8] = b"id,price\n1,10\n1,10\n2,\n";

    #[test]
    fn first_load_becomes_current() {
        let mut session = Session::new();
        session.load("b.csv", SALES, SourceFormat::Csv).unwrap();
        session.load("a.csv", SALES, SourceFormat::Csv).unwrap();
        assert_eq!(session.current_name(), Some("b.csv"));
        assert_eq!(session.names(), vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn removing_current_moves_to_first_name() {
        let mut session = Session::new();
        for name in ["c.csv", "a.csv", "b.csv"] {
            session.load(name, SALES, SourceFormat::Csv).unwrap();
        }
        session.remove("c.csv").unwrap();
        assert_eq!(session.current_name(), Some("a.csv"));
        session.remove("a.csv").unwrap();
        session.remove("b.csv").unwrap();
        assert_eq!(session.current_name(), None);
        assert!(session.is_empty());
    }

    #[test]
    fn failed_load_leaves_session_unchanged() {
        let mut session = Session::new();
        session.load("a.csv", SALES, SourceFormat::Csv).unwrap();
        let err = session.load("a.csv", b"x,x\n1,2\n", SourceFormat::Csv);
        assert!(matches!(err, Err(SessionError::Parse(_))));
        assert_eq!(session.get("a.csv").unwrap().working().height(), 3);
    }

    #[test]
    fn reload_replaces_dataset() {
        let mut session = Session::new();
        session.load("a.csv", SALES, SourceFormat::Csv).unwrap();
        session.load("a.csv", b"id\n1\n", SourceFormat::Csv).unwrap();
        assert_eq!(session.len(), 1);
        assert_eq!(session.get("a.csv").unwrap().working().width(), 1);
    }

    #[test]
    fn failed_transform_keeps_working_table() {
        let mut session = Session::new();
        session.load("a.csv", SALES, SourceFormat::Csv).unwrap();
        let before = session.get("a.csv").unwrap().working().clone();
        let err = session.apply(
            "a.csv",
            &Transform::RenameColumn {
                old: "id".into(),
                new: "price".into(),
            },
        );
        assert!(matches!(err, Err(SessionError::Transform(_))));
        assert!(tables_equal(session.get("a.csv").unwrap().working(), &before));
    }

    #[test]
    fn apply_current_requires_a_dataset() {
        let mut session = Session::new();
        assert!(matches!(
            session.apply_current(&Transform::Dedup),
            Err(SessionError::NoCurrentDataset)
        ));
    }

    #[test]
    fn unknown_names_are_not_found() {
        let mut session = Session::new();
        assert!(matches!(
            session.remove("nope"),
            Err(SessionError::DatasetNotFound(name)) if name == "nope"
        ));
        assert!(session.reset("nope").is_err());
        assert!(session.set_current("nope").is_err());
    }

    #[test]
    fn load_file_detects_format() {
        let mut session = Session::new();
        session.load_file("sales.CSV", SALES).unwrap();
        assert_eq!(session.get("sales.CSV").unwrap().format(), SourceFormat::Csv);
        assert!(matches!(
            session.load_file("sales.txt", SALES),
            Err(SessionError::Parse(ParseError::UnsupportedFormat { .. }))
        ));
    }
}
