//! Integration tests for the command workflows.

use std::fs;
use std::io::Read;

use flate2::read::GzDecoder;

use sweep_cli::pipeline::{
    Input, clean, find_outliers, inspect, sample_artifact, write_artifact,
};
use sweep_cli::recipe::{ExportOverrides, Recipe};
use sweep_model::{ExportFormat, OutlierMethod};

const SALES: &str = "\
region,price,qty
north,10,1
north,10,1
south,,2
east,30,3
west,1000,4
";

fn input() -> Input {
    Input {
        name: "sales.csv".to_string(),
        bytes: SALES.as_bytes().to_vec(),
    }
}

#[test]
fn inspect_reports_stats_and_preview() {
    let inspection = inspect(&input(), 2).unwrap();
    assert_eq!(inspection.stats.rows, 5);
    assert_eq!(inspection.stats.duplicate_rows, 1);
    assert_eq!(inspection.stats.missing_cells, 1);
    assert_eq!(inspection.preview.height(), 2);
    let price = inspection
        .columns
        .iter()
        .find(|column| column.name == "price")
        .unwrap();
    assert_eq!(price.missing, 1);

    let names: Vec<&str> = inspection.numeric.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["price", "qty"]);
    let price = &inspection.numeric[0];
    assert_eq!(price.count, 4);
    assert_eq!(price.median, Some(20.0));
    assert_eq!(price.max, Some(1000.0));
}

#[test]
fn sample_catalog_writes_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = sample_artifact().unwrap();
    assert_eq!(artifact.file_name, "sample_data.csv");
    let path = write_artifact(dir.path(), &artifact).unwrap();

    let inspection = inspect(&Input::read(&path).unwrap(), 3).unwrap();
    assert_eq!(inspection.stats.rows, 105);
    assert_eq!(inspection.stats.duplicate_rows, 5);
    assert_eq!(inspection.stats.missing_cells, 16);
    assert!(inspection.numeric.iter().any(|s| s.name == "Price"));
}

#[test]
fn recipe_file_drives_clean_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let recipe_path = dir.path().join("recipe.toml");
    fs::write(
        &recipe_path,
        r#"
[[steps]]
op = "dedup"

[[steps]]
op = "fill-numeric"
strategy = "mean"

[[steps]]
op = "derive-column"
name = "total"
source = { expression = "price * qty" }

[export]
format = "markdown"
columns = ["region", "total"]
filter = "total < 1000"
"#,
    )
    .unwrap();

    let recipe = Recipe::load(&recipe_path).unwrap();
    let report = clean(&input(), &recipe).unwrap();
    let shapes: Vec<(usize, usize)> = report
        .steps
        .iter()
        .map(|step| (step.rows, step.columns))
        .collect();
    assert_eq!(shapes, vec![(4, 3), (4, 3), (4, 4)]);
    insta::assert_snapshot!(report.changes.lines().join("\n"), @r"
    Rows: 5 → 4 (-1)
    Columns: 3 → 4 (+1)
    Missing values: 1 → 0 (-1)
    Duplicates: 1 → 0 (-1)
    ");

    assert_eq!(report.artifact.file_name, "sales.md");
    let markdown = String::from_utf8(report.artifact.bytes.clone()).unwrap();
    assert!(markdown.contains("north"));
    assert!(markdown.contains("south"));
    assert!(!markdown.contains("west"));
    assert!(!markdown.contains("price"));

    let out_dir = dir.path().join("cleaned");
    let path = write_artifact(&out_dir, &report.artifact).unwrap();
    assert_eq!(path, out_dir.join("sales.md"));
    assert_eq!(fs::read(&path).unwrap(), report.artifact.bytes);
}

#[test]
fn failing_step_is_named() {
    let recipe = Recipe::from_toml(
        r#"
[[steps]]
op = "dedup"

[[steps]]
op = "rename-column"
old = "region"
new = "price"
"#,
    )
    .unwrap();
    let err = clean(&input(), &recipe).err().unwrap();
    let message = format!("{err:#}");
    assert!(message.contains("step 2"), "{message}");
    assert!(message.contains("price"), "{message}");
}

#[test]
fn overrides_select_gzip_csv() {
    let mut recipe = Recipe::default();
    ExportOverrides {
        format: Some(ExportFormat::Csv),
        compression: Some(sweep_model::Compression::Gzip),
        ..ExportOverrides::default()
    }
    .apply_to(&mut recipe.export);
    let report = clean(&input(), &recipe).unwrap();
    assert_eq!(report.artifact.file_name, "sales.csv.gz");
    let mut text = String::new();
    GzDecoder::new(report.artifact.bytes.as_slice())
        .read_to_string(&mut text)
        .unwrap();
    assert!(text.starts_with("region,price,qty\n"));
}

#[test]
fn outliers_report_values() {
    let rows = find_outliers(&input(), "price", &OutlierMethod::iqr(1.5)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row, 4);
    assert_eq!(rows[0].value, "1000");
}

#[test]
fn unknown_extension_fails_to_load() {
    let input = Input {
        name: "sales.txt".to_string(),
        bytes: SALES.as_bytes().to_vec(),
    };
    let err = inspect(&input, 5).err().unwrap();
    assert!(format!("{err:#}").contains("sales.txt"));
}
