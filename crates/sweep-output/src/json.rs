//! Row-oriented JSON export.
//!
//! Rows are written as objects in column order. Serialization streams
//! straight from the columns, so no intermediate map reorders the keys.

use polars::prelude::*;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use sweep_model::{any_to_string, datetime_to_millis, format_datetime_millis, is_missing};

use crate::cell;
use crate::error::Result;

const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Serializes the table as `[{"col": value, ...}, ...]`.
///
/// Missing values and `NaN` become `null`; datetimes become ISO 8601 text.
pub fn write_json(df: &DataFrame) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&Records {
        columns: df.get_columns(),
        height: df.height(),
    })?)
}

struct Records<'a> {
    columns: &'a [Column],
    height: usize,
}

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.height))?;
        for row in 0..self.height {
            seq.serialize_element(&Record {
                columns: self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

struct Record<'a> {
    columns: &'a [Column],
    row: usize,
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column.name().as_str(), &JsonCell(cell(column, self.row)))?;
        }
        map.end()
    }
}

struct JsonCell<'a>(AnyValue<'a>);

impl Serialize for JsonCell<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if is_missing(&self.0) {
            return serializer.serialize_unit();
        }
        match &self.0 {
            AnyValue::Boolean(v) => serializer.serialize_bool(*v),
            AnyValue::Int8(v) => serializer.serialize_i64(i64::from(*v)),
            AnyValue::Int16(v) => serializer.serialize_i64(i64::from(*v)),
            AnyValue::Int32(v) => serializer.serialize_i64(i64::from(*v)),
            AnyValue::Int64(v) => serializer.serialize_i64(*v),
            AnyValue::UInt8(v) => serializer.serialize_u64(u64::from(*v)),
            AnyValue::UInt16(v) => serializer.serialize_u64(u64::from(*v)),
            AnyValue::UInt32(v) => serializer.serialize_u64(u64::from(*v)),
            AnyValue::UInt64(v) => serializer.serialize_u64(*v),
            AnyValue::Float32(v) => serializer.serialize_f64(f64::from(*v)),
            AnyValue::Float64(v) => serializer.serialize_f64(*v),
            AnyValue::String(s) => serializer.serialize_str(s),
            AnyValue::StringOwned(s) => serializer.serialize_str(s.as_str()),
            AnyValue::Datetime(v, unit, _) => {
                match format_datetime_millis(datetime_to_millis(*v, *unit), ISO_DATETIME) {
                    Some(text) => serializer.serialize_str(&text),
                    None => serializer.serialize_unit(),
                }
            }
            other => serializer.serialize_str(&any_to_string(other.clone())),
        }
    }
}
