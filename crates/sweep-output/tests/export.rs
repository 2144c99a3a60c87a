//! Integration tests for the export writers.

use std::io::{Cursor, Read};

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use flate2::read::GzDecoder;
use polars::prelude::*;
use sweep_model::{Compression, ExportFormat};
use sweep_output::{ExportError, ExportOptions, export_table, write_html};

fn sample() -> DataFrame {
    DataFrame::new(vec![
        Series::new("id".into(), vec![1i64, 2]).into(),
        Series::new("city".into(), vec![Some("Oslo"), None]).into(),
        Series::new("score".into(), vec![Some(9.5), Some(f64::NAN)]).into(),
    ])
    .unwrap()
}

#[test]
fn html_matches_dataframe_layout() {
    insta::assert_snapshot!(write_html(&sample(), true), @r#"
    <table border="1" class="dataframe">
      <thead>
        <tr style="text-align: right;">
          <th></th>
          <th>id</th>
          <th>city</th>
          <th>score</th>
        </tr>
      </thead>
      <tbody>
        <tr>
          <th>0</th>
          <td>1</td>
          <td>Oslo</td>
          <td>9.5</td>
        </tr>
        <tr>
          <th>1</th>
          <td>2</td>
          <td></td>
          <td></td>
        </tr>
      </tbody>
    </table>
    "#);
}

#[test]
fn json_export_artifact() {
    let options = ExportOptions {
        format: ExportFormat::Json,
        ..ExportOptions::default()
    };
    let artifact = export_table(&sample(), "cities.csv", &options).unwrap();
    assert_eq!(artifact.file_name, "cities.json");
    assert_eq!(artifact.mime_type, "application/json");
    let text = String::from_utf8(artifact.bytes).unwrap();
    insta::assert_snapshot!(text, @r#"[{"id":1,"city":"Oslo","score":9.5},{"id":2,"city":null,"score":null}]"#);
}

#[test]
fn gzip_csv_round_trips() {
    let options = ExportOptions {
        format: ExportFormat::Csv,
        compression: Some(Compression::Gzip),
        include_index: false,
    };
    let artifact = export_table(&sample(), "cities.csv", &options).unwrap();
    assert_eq!(artifact.file_name, "cities.csv.gz");
    assert_eq!(artifact.mime_type, "application/gzip");
    let mut text = String::new();
    GzDecoder::new(artifact.bytes.as_slice())
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, "id,city,score\n1,Oslo,9.5\n2,,\n");
}

#[test]
fn zip_csv_contains_plain_csv_entry() {
    let options = ExportOptions {
        format: ExportFormat::Csv,
        compression: Some(Compression::Zip),
        include_index: false,
    };
    let artifact = export_table(&sample(), "cities.csv", &options).unwrap();
    assert_eq!(artifact.file_name, "cities.zip");
    let mut archive = ::zip::ZipArchive::new(Cursor::new(artifact.bytes.as_slice())).unwrap();
    assert!(archive.by_name("cities.csv").is_ok());
}

#[test]
fn unsupported_compression_is_rejected() {
    let options = ExportOptions {
        format: ExportFormat::Csv,
        compression: Some(Compression::Bz2),
        include_index: false,
    };
    assert!(matches!(
        export_table(&sample(), "cities.csv", &options),
        Err(ExportError::UnsupportedCompression(Compression::Bz2))
    ));
}

#[test]
fn compression_is_csv_only() {
    let options = ExportOptions {
        format: ExportFormat::Html,
        compression: Some(Compression::Gzip),
        include_index: false,
    };
    assert!(matches!(
        export_table(&sample(), "cities.csv", &options),
        Err(ExportError::CompressionRequiresCsv(ExportFormat::Html))
    ));
}

#[test]
fn excel_workbook_reads_back() {
    let options = ExportOptions {
        format: ExportFormat::Excel,
        ..ExportOptions::default()
    };
    let artifact = export_table(&sample(), "cities.csv", &options).unwrap();
    assert_eq!(artifact.file_name, "cities.xlsx");

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(artifact.bytes)).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Sheet1".to_string()]);
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    let rows: Vec<&[Data]> = range.rows().collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][1], Data::String("city".into()));
    assert_eq!(rows[1][0], Data::Float(1.0));
    assert_eq!(rows[2][1], Data::Empty);
    assert_eq!(rows[2][2], Data::Empty);
}
