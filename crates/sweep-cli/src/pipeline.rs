//! File-level workflows behind the subcommands.
//!
//! Each function runs one command against a fresh [`Session`] and returns
//! plain data for the caller to print, so the workflows can be tested
//! without capturing stdout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use sweep_core::{ExportRequest, SAMPLE_DATASET, Session};
use sweep_model::{
    ChangeSummary, ColumnSummary, NumericSummary, OutlierMethod, TableStats, any_to_string,
    column_summaries, describe,
};
use sweep_output::ExportArtifact;
use tracing::{debug, info, info_span, trace};

use crate::logging::redact_value;
use crate::recipe::Recipe;

/// A loaded input file.
pub struct Input {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Input {
    pub fn read(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("{} is not a file", path.display()))?;
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        Ok(Self { name, bytes })
    }
}

fn load(input: &Input) -> Result<Session> {
    let mut session = Session::new();
    session
        .load_file(&input.name, &input.bytes)
        .with_context(|| format!("load {}", input.name))?;
    Ok(session)
}

pub struct Inspection {
    pub name: String,
    pub size: String,
    pub stats: TableStats,
    pub columns: Vec<ColumnSummary>,
    pub numeric: Vec<NumericSummary>,
    pub preview: DataFrame,
}

/// Loads a file and summarizes it, keeping the first `rows` rows as a preview.
pub fn inspect(input: &Input, rows: usize) -> Result<Inspection> {
    let session = load(input)?;
    let dataset = session.get(&input.name)?;
    Ok(Inspection {
        name: input.name.clone(),
        size: dataset.size_label(),
        stats: dataset.stats(),
        columns: column_summaries(dataset.working()),
        numeric: describe(dataset.working()),
        preview: dataset.working().head(Some(rows)),
    })
}

/// The built-in sample catalog, exported as CSV.
pub fn sample_artifact() -> Result<ExportArtifact> {
    let mut session = Session::new();
    session.load_sample().context("build sample data")?;
    session
        .export(SAMPLE_DATASET, &ExportRequest::default())
        .context("export sample data")
}

/// One applied recipe step and the table shape after it.
pub struct StepReport {
    pub step: String,
    pub rows: usize,
    pub columns: usize,
}

pub struct CleanReport {
    pub dataset: String,
    pub steps: Vec<StepReport>,
    pub changes: ChangeSummary,
    pub artifact: ExportArtifact,
}

/// Applies the recipe steps in order, then exports the result.
///
/// The first failing step aborts the run; the error names the step.
pub fn clean(input: &Input, recipe: &Recipe) -> Result<CleanReport> {
    let span = info_span!("clean", dataset = %input.name);
    let _guard = span.enter();

    let mut session = load(input)?;
    let mut steps = Vec::with_capacity(recipe.steps.len());
    for (idx, step) in recipe.steps.iter().enumerate() {
        let dataset = session
            .apply(&input.name, step)
            .with_context(|| format!("step {} ({step}) failed", idx + 1))?;
        let (rows, columns) = dataset.working().shape();
        steps.push(StepReport {
            step: step.to_string(),
            rows,
            columns,
        });
    }

    if let Some(filter) = &recipe.export.filter {
        debug!(filter = redact_value(filter), "export row filter");
    }
    let artifact = session
        .export(&input.name, &recipe.export)
        .context("export failed")?;
    let changes = session.changes(&input.name)?;
    info!(steps = steps.len(), file = %artifact.file_name, "clean finished");
    Ok(CleanReport {
        dataset: input.name.clone(),
        steps,
        changes,
        artifact,
    })
}

/// A flagged row: its index and the rendered value.
pub struct OutlierRow {
    pub row: usize,
    pub value: String,
}

pub fn find_outliers(
    input: &Input,
    column: &str,
    method: &OutlierMethod,
) -> Result<Vec<OutlierRow>> {
    let session = load(input)?;
    let flagged = session
        .detect_outliers(&input.name, column, method)
        .with_context(|| format!("detect outliers in {column}"))?;
    let values = session.get(&input.name)?.working().column(column)?;
    let rows = flagged
        .into_iter()
        .map(|row| {
            let value = any_to_string(values.get(row)?);
            trace!(row, value = redact_value(&value), "flagged value");
            Ok(OutlierRow { row, value })
        })
        .collect::<polars::prelude::PolarsResult<Vec<_>>>()?;
    info!(column, %method, flagged = rows.len(), "outlier scan finished");
    Ok(rows)
}

/// Writes an export into `dir`, creating the directory when needed.
pub fn write_artifact(dir: &Path, artifact: &ExportArtifact) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(&artifact.file_name);
    fs::write(&path, &artifact.bytes).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), bytes = artifact.bytes.len(), "wrote export");
    Ok(path)
}
