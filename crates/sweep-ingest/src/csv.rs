//! CSV parsing for uploaded bytes.

use std::collections::HashSet;
use std::io::Cursor;

use polars::prelude::*;

use crate::error::{ParseError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Checks the byte-order mark and UTF-8 validity, returning the text
/// without a UTF-8 BOM.
pub fn decode_utf8<'a>(name: &str, bytes: &'a [u8]) -> Result<&'a str> {
    // UTF-16 BOMs are rejected before the UTF-8 check so the error names them.
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(ParseError::UnsupportedEncoding {
            name: name.to_string(),
            encoding: "UTF-16 LE",
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(ParseError::UnsupportedEncoding {
            name: name.to_string(),
            encoding: "UTF-16 BE",
        });
    }
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(body).map_err(|_| ParseError::UnsupportedEncoding {
        name: name.to_string(),
        encoding: "non-UTF-8",
    })
}

/// Validates a header row: present, no blank names, no repeats.
pub fn validate_headers<'h>(
    name: &str,
    headers: impl IntoIterator<Item = &'h str>,
) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut validated = Vec::new();
    for (index, header) in headers.into_iter().enumerate() {
        if header.trim().is_empty() {
            return Err(ParseError::EmptyColumnName {
                name: name.to_string(),
                index,
            });
        }
        if !seen.insert(header.to_string()) {
            return Err(ParseError::DuplicateColumn {
                name: name.to_string(),
                column: header.to_string(),
            });
        }
        validated.push(header.to_string());
    }
    if validated.is_empty() {
        return Err(ParseError::NoHeader {
            name: name.to_string(),
        });
    }
    Ok(validated)
}

/// Reads the header row and checks that no record has more fields than it.
fn scan_structure(name: &str, text: &str) -> Result<Vec<String>> {
    let csv_error = |message: String| ParseError::Csv {
        name: name.to_string(),
        message,
    };
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| csv_error(e.to_string()))?
        .clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ParseError::NoHeader {
            name: name.to_string(),
        });
    }
    let headers = validate_headers(name, headers.iter())?;

    for record in reader.records() {
        let record = record.map_err(|e| csv_error(e.to_string()))?;
        if record.len() > headers.len() {
            let line = record.position().map_or(0, ::csv::Position::line);
            return Err(csv_error(format!(
                "line {line} has {} fields, expected {}",
                record.len(),
                headers.len()
            )));
        }
    }
    Ok(headers)
}

/// Parses CSV bytes into a DataFrame.
///
/// The first row is the header; empty fields are missing. Column types are
/// inferred from every row. When typed parsing still fails, the file is
/// read again with every column as text.
pub fn read_csv_bytes(name: &str, bytes: &[u8]) -> Result<DataFrame> {
    if bytes.is_empty() {
        return Err(ParseError::Empty {
            name: name.to_string(),
        });
    }
    let text = decode_utf8(name, bytes)?;
    let headers = scan_structure(name, text)?;

    let df = match read_with_inference(text, None) {
        Ok(df) => df,
        Err(typed) => {
            tracing::warn!(name, error = %typed, "typed CSV parse failed, reading as text");
            read_with_inference(text, Some(0)).map_err(|e| ParseError::Csv {
                name: name.to_string(),
                message: e.to_string(),
            })?
        }
    };

    tracing::debug!(
        name,
        columns = headers.len(),
        rows = df.height(),
        "parsed CSV"
    );
    Ok(df)
}

/// Runs the Polars reader. `None` infers over all rows, `Some(0)` reads
/// every column as text.
fn read_with_inference(text: &str, infer_rows: Option<usize>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_rows)
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_utf8_bom() {
        let bytes = b"\xEF\xBB\xBFa,b\n1,2\n";
        assert_eq!(decode_utf8("t.csv", bytes).unwrap(), "a,b\n1,2\n");
    }

    #[test]
    fn test_decode_rejects_utf16() {
        let err = decode_utf8("t.csv", &[0xFF, 0xFE, b'a', 0]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnsupportedEncoding {
                encoding: "UTF-16 LE",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_rejects_latin1() {
        let err = decode_utf8("t.csv", b"caf\xE9,x\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedEncoding { .. }));
    }

    #[test]
    fn test_validate_headers() {
        assert_eq!(
            validate_headers("t", ["a", "b c"]).unwrap(),
            vec!["a".to_string(), "b c".to_string()]
        );
        assert!(matches!(
            validate_headers("t", ["a", "  "]),
            Err(ParseError::EmptyColumnName { index: 1, .. })
        ));
        assert!(matches!(
            validate_headers("t", ["a", "a"]),
            Err(ParseError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_read_infers_types() {
        let df = read_csv_bytes("t.csv", b"id,price,name\n1,2.5,x\n2,,y\n").unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("name").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("price").unwrap().null_count(), 1);
    }

    #[test]
    fn test_late_text_value_widens_column() {
        let mut body = String::from("id,code\n");
        for idx in 0..150 {
            body.push_str(&format!("{idx},{idx}\n"));
        }
        body.push_str("150,ABC\n");
        let df = read_csv_bytes("late.csv", body.as_bytes()).unwrap();
        assert_eq!(df.height(), 151);
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("code").unwrap().dtype(), &DataType::String);
        assert_eq!(
            df.column("code").unwrap().get(150).unwrap(),
            AnyValue::String("ABC")
        );
    }

    #[test]
    fn test_text_fallback_reads_every_column_as_text() {
        let df = read_with_inference("a,b\n1,x\n", Some(0)).unwrap();
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_read_rejects_extra_fields() {
        let err = read_csv_bytes("t.csv", b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, ParseError::Csv { .. }));
    }

    #[test]
    fn test_read_rejects_empty() {
        assert!(matches!(
            read_csv_bytes("t.csv", b""),
            Err(ParseError::Empty { .. })
        ));
    }
}
