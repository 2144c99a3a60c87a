//! Built-in demo dataset: a small product catalog with gaps and repeats.

use polars::prelude::*;
use sweep_model::SourceFormat;
use sweep_output::write_csv;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::session::Session;

/// Name the sample dataset is stored under.
pub const SAMPLE_DATASET: &str = "sample_data.csv";

const CATEGORIES: [&str; 5] = ["Electronics", "Clothing", "Food", "Books", "Other"];
const PRODUCTS: i64 = 100;
const REPEATED_ROWS: usize = 5;
/// 2023-01-01T00:00:00Z.
const FIRST_ADDED_MILLIS: i64 = 1_672_531_200_000;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Builds the sample catalog.
///
/// 100 products with deterministic values. Ten prices and five categories
/// are missing, and the first five rows are appended again at the end.
pub fn sample_table() -> PolarsResult<DataFrame> {
    let ids: Vec<i64> = (1..=PRODUCTS).collect();
    let names: Vec<String> = ids.iter().map(|id| format!("Product {id}")).collect();
    let categories: Vec<Option<&str>> = ids
        .iter()
        .map(|id| (id % 20 != 7).then(|| CATEGORIES[*id as usize % CATEGORIES.len()]))
        .collect();
    let prices: Vec<Option<f64>> = ids
        .iter()
        .map(|id| (id % 10 != 3).then(|| 10.0 + ((id * 7919) % 99_001) as f64 / 100.0))
        .collect();
    let stock: Vec<i64> = ids.iter().map(|id| (id * 37) % 100).collect();
    let ratings: Vec<f64> = ids
        .iter()
        .map(|id| 1.0 + ((id * 13) % 41) as f64 / 10.0)
        .collect();
    let added: Vec<i64> = ids
        .iter()
        .map(|id| FIRST_ADDED_MILLIS + (id - 1) * MILLIS_PER_DAY)
        .collect();

    let df = DataFrame::new(vec![
        Series::new("ID".into(), ids).into(),
        Series::new("Name".into(), names).into(),
        Series::new("Category".into(), categories).into(),
        Series::new("Price".into(), prices).into(),
        Series::new("Stock".into(), stock).into(),
        Series::new("Rating".into(), ratings).into(),
        Series::new("Date Added".into(), added)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .into(),
    ])?;
    let repeats = df.head(Some(REPEATED_ROWS));
    df.vstack(&repeats)
}

impl Session {
    /// Loads the sample catalog as [`SAMPLE_DATASET`] and makes it current.
    ///
    /// The recorded size is that of the catalog written as CSV.
    pub fn load_sample(&mut self) -> Result<&Dataset> {
        let table = sample_table()?;
        let byte_size = write_csv(&table)?.len() as u64;
        self.insert(Dataset::new(
            SAMPLE_DATASET,
            table,
            byte_size,
            SourceFormat::Csv,
        ));
        self.set_current(SAMPLE_DATASET)?;
        self.get(SAMPLE_DATASET)
    }
}
