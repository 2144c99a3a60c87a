//! CLI argument definitions for the data sweeper.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use sweep_model::{
    Compression, DEFAULT_IQR_FACTOR, DEFAULT_ZSCORE_THRESHOLD, ExportFormat, FillStrategy,
    OutlierMethod,
};

#[derive(Parser)]
#[command(
    name = "data-sweeper",
    version,
    about = "Clean tabular data files and export them in other formats",
    long_about = "Load CSV or Excel files, apply cleaning steps from a recipe \
                  and export the result as CSV, Excel, JSON, HTML or Markdown."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show statistics, column types and a preview of a file.
    Inspect(InspectArgs),

    /// Apply cleaning steps and export the result.
    Clean(CleanArgs),

    /// List the rows a numeric column flags as outliers.
    Outliers(OutlierArgs),

    /// Write a demo product catalog with missing values and duplicates.
    Sample(SampleArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    /// CSV, .xlsx or .xls file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Number of preview rows.
    #[arg(long = "rows", default_value_t = 5)]
    pub rows: usize,
}

#[derive(Args)]
pub struct CleanArgs {
    /// CSV, .xlsx or .xls file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// TOML recipe with [[steps]] and an optional [export] table.
    #[arg(long = "recipe", value_name = "PATH")]
    pub recipe: Option<PathBuf>,

    /// Remove duplicate rows after the recipe steps.
    #[arg(long = "dedup")]
    pub dedup: bool,

    /// Fill missing numeric values after the recipe steps.
    #[arg(long = "fill-numeric", value_name = "STRATEGY")]
    pub fill_numeric: Option<FillStrategy>,

    /// Directory for the exported file (default: <FILE dir>/cleaned).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Export format (csv, excel, json, html, markdown).
    #[arg(long = "format")]
    pub format: Option<ExportFormat>,

    /// Compress a CSV export (gzip or zip).
    #[arg(long = "compression")]
    pub compression: Option<Compression>,

    /// Columns to export, in order.
    #[arg(long = "columns", value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Only export rows where this expression is true.
    #[arg(long = "filter", value_name = "EXPR")]
    pub filter: Option<String>,

    /// Add a row index column (HTML and Markdown).
    #[arg(long = "include-index")]
    pub include_index: bool,

    /// Run the steps and report without writing the export.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct OutlierArgs {
    /// CSV, .xlsx or .xls file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Numeric column to scan.
    #[arg(long = "column")]
    pub column: String,

    /// Detection method.
    #[arg(long = "method", value_enum, default_value = "iqr")]
    pub method: MethodArg,

    /// Z-score threshold or IQR factor (defaults: 3 and 1.5).
    #[arg(long = "threshold")]
    pub threshold: Option<f64>,
}

#[derive(Args)]
pub struct SampleArgs {
    /// Directory to write sample_data.csv into.
    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Number of preview rows.
    #[arg(long = "rows", default_value_t = 5)]
    pub rows: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Zscore,
    Iqr,
}

impl OutlierArgs {
    pub fn method(&self) -> OutlierMethod {
        match self.method {
            MethodArg::Zscore => {
                OutlierMethod::zscore(self.threshold.unwrap_or(DEFAULT_ZSCORE_THRESHOLD))
            }
            MethodArg::Iqr => OutlierMethod::iqr(self.threshold.unwrap_or(DEFAULT_IQR_FACTOR)),
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
