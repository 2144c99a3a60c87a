//! Closed option sets for loading, cleaning and exporting tables.
//!
//! Every enum parses case-insensitively from its kebab-case name (spaces and
//! underscores are accepted in place of hyphens) and serializes in kebab-case
//! so recipe files and CLI flags share one spelling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

fn normalize_option(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|ch| if ch == '_' || ch == ' ' { '-' } else { ch })
        .collect()
}

fn unknown(kind: &'static str, value: &str) -> ModelError {
    ModelError::UnknownOption {
        kind,
        value: value.to_string(),
    }
}

/// Upload formats accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    Csv,
    Xlsx,
    /// Legacy binary workbook.
    Xls,
}

impl SourceFormat {
    /// Detects the format from a file name's extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;
        extension.parse().ok()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Xlsx => "xlsx",
            SourceFormat::Xls => "xls",
        }
    }
}

impl FromStr for SourceFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).trim_start_matches('.') {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" => Ok(SourceFormat::Xlsx),
            "xls" => Ok(SourceFormat::Xls),
            _ => Err(unknown("source format", s)),
        }
    }
}

/// Output formats for exported views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
    Json,
    Html,
    Markdown,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Csv,
        ExportFormat::Excel,
        ExportFormat::Json,
        ExportFormat::Html,
        ExportFormat::Markdown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
            ExportFormat::Markdown => "markdown",
        }
    }

    /// File extension used for exported files.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
            ExportFormat::Html => "text/html",
            ExportFormat::Markdown => "text/markdown",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            "html" | "htm" => Ok(ExportFormat::Html),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(unknown("export format", s)),
        }
    }
}

/// Compression codecs offered for CSV exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compression {
    Gzip,
    Zip,
    Bz2,
    Xz,
}

impl Compression {
    pub fn as_str(self) -> &'static str {
        match self {
            Compression::Gzip => "gzip",
            Compression::Zip => "zip",
            Compression::Bz2 => "bz2",
            Compression::Xz => "xz",
        }
    }
}

impl FromStr for Compression {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "gzip" | "gz" => Ok(Compression::Gzip),
            "zip" => Ok(Compression::Zip),
            "bz2" | "bzip2" => Ok(Compression::Bz2),
            "xz" => Ok(Compression::Xz),
            _ => Err(unknown("compression", s)),
        }
    }
}

/// Statistic used to impute missing numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillStrategy {
    Mean,
    Median,
}

impl FillStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            FillStrategy::Mean => "mean",
            FillStrategy::Median => "median",
        }
    }
}

impl FromStr for FillStrategy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "mean" => Ok(FillStrategy::Mean),
            "median" => Ok(FillStrategy::Median),
            _ => Err(unknown("fill strategy", s)),
        }
    }
}

/// Target type for column conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionTarget {
    String,
    Integer,
    Float,
    Datetime,
    Category,
}

impl ConversionTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            ConversionTarget::String => "string",
            ConversionTarget::Integer => "integer",
            ConversionTarget::Float => "float",
            ConversionTarget::Datetime => "datetime",
            ConversionTarget::Category => "category",
        }
    }
}

impl FromStr for ConversionTarget {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "string" | "str" | "text" => Ok(ConversionTarget::String),
            "integer" | "int" => Ok(ConversionTarget::Integer),
            "float" | "number" => Ok(ConversionTarget::Float),
            "datetime" | "date" => Ok(ConversionTarget::Datetime),
            "category" => Ok(ConversionTarget::Category),
            _ => Err(unknown("conversion target", s)),
        }
    }
}

/// Text normalization steps, applied in the order given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextOp {
    Lowercase,
    Uppercase,
    Trim,
    StripSpecialChars,
    ExtractNumbers,
}

impl TextOp {
    pub fn as_str(self) -> &'static str {
        match self {
            TextOp::Lowercase => "lowercase",
            TextOp::Uppercase => "uppercase",
            TextOp::Trim => "trim",
            TextOp::StripSpecialChars => "strip-special-chars",
            TextOp::ExtractNumbers => "extract-numbers",
        }
    }
}

impl FromStr for TextOp {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "lowercase" | "lower" => Ok(TextOp::Lowercase),
            "uppercase" | "upper" => Ok(TextOp::Uppercase),
            "trim" | "remove-whitespace" => Ok(TextOp::Trim),
            "strip-special-chars" | "remove-special-characters" => Ok(TextOp::StripSpecialChars),
            "extract-numbers" => Ok(TextOp::ExtractNumbers),
            _ => Err(unknown("text operation", s)),
        }
    }
}

/// Binary operator for column arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    #[serde(rename = "+", alias = "add")]
    Add,
    #[serde(rename = "-", alias = "subtract")]
    Subtract,
    #[serde(rename = "*", alias = "multiply")]
    Multiply,
    #[serde(rename = "/", alias = "divide")]
    Divide,
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }

    /// Applies the operator. Division by zero yields `None`.
    pub fn apply(self, left: f64, right: f64) -> Option<f64> {
        match self {
            ArithmeticOp::Add => Some(left + right),
            ArithmeticOp::Subtract => Some(left - right),
            ArithmeticOp::Multiply => Some(left * right),
            ArithmeticOp::Divide if right == 0.0 => None,
            ArithmeticOp::Divide => Some(left / right),
        }
    }
}

impl FromStr for ArithmeticOp {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "+" | "add" => Ok(ArithmeticOp::Add),
            "-" | "subtract" => Ok(ArithmeticOp::Subtract),
            "*" | "multiply" => Ok(ArithmeticOp::Multiply),
            "/" | "divide" => Ok(ArithmeticOp::Divide),
            _ => Err(unknown("arithmetic operator", s)),
        }
    }
}

/// Outlier detection rule for a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum OutlierMethod {
    /// Flags `|x - mean| / sd > threshold`.
    #[serde(rename = "zscore")]
    ZScore {
        #[serde(default = "default_zscore_threshold")]
        threshold: f64,
    },
    /// Flags values outside `[Q1 - factor*IQR, Q3 + factor*IQR]`.
    Iqr {
        #[serde(default = "default_iqr_factor")]
        factor: f64,
    },
}

pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;
pub const DEFAULT_IQR_FACTOR: f64 = 1.5;

fn default_zscore_threshold() -> f64 {
    DEFAULT_ZSCORE_THRESHOLD
}

fn default_iqr_factor() -> f64 {
    DEFAULT_IQR_FACTOR
}

impl OutlierMethod {
    pub fn zscore(threshold: f64) -> Self {
        OutlierMethod::ZScore { threshold }
    }

    pub fn iqr(factor: f64) -> Self {
        OutlierMethod::Iqr { factor }
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlierMethod::ZScore { threshold } => write!(f, "zscore(threshold={threshold})"),
            OutlierMethod::Iqr { factor } => write!(f, "iqr(factor={factor})"),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(
    SourceFormat,
    ExportFormat,
    Compression,
    FillStrategy,
    ConversionTarget,
    TextOp,
);

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
