//! Parquet output for [`Table`]s, plus typed read-back.
//!
//! - [`table_to_record_batch`] maps each column to an Arrow array using the
//!   column's inferred [`ColumnType`].
//! - [`write_table_parquet`] writes one batch with `parquet::arrow::ArrowWriter`.
//! - [`read_parquet_vec`] reads a file back into typed rows with
//!   `serde_arrow::from_record_batch`.
//!
//! Type mapping (all fields nullable):
//!
//! | column type | Arrow type |
//! |---|---|
//! | `integer` | `Int64` |
//! | `float` | `Float64` |
//! | `boolean` | `Boolean` |
//! | `text` | `Utf8` |
//! | `null`, `json`, `mixed` | `Utf8` (strings as-is, other values as JSON text) |

use crate::table::{ColumnType, Table};
use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde::de::DeserializeOwned;
use serde_arrow::from_record_batch;
use serde_json::Value;
use std::fmt;
use std::fs::{create_dir_all, File};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Compression codec for written files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParquetCompression {
    None,
    #[default]
    Snappy,
    Gzip,
    Zstd,
}

impl ParquetCompression {
    fn codec(self) -> Compression {
        match self {
            Self::None => Compression::UNCOMPRESSED,
            Self::Snappy => Compression::SNAPPY,
            Self::Gzip => Compression::GZIP(GzipLevel::default()),
            Self::Zstd => Compression::ZSTD(ZstdLevel::default()),
        }
    }
}

impl FromStr for ParquetCompression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "uncompressed" => Ok(Self::None),
            "snappy" => Ok(Self::Snappy),
            "gzip" => Ok(Self::Gzip),
            "zstd" => Ok(Self::Zstd),
            other => Err(format!(
                "unknown compression '{other}' (expected none, snappy, gzip or zstd)"
            )),
        }
    }
}

impl fmt::Display for ParquetCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Snappy => "snappy",
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
        })
    }
}

/// Convert a table into a single Arrow `RecordBatch`.
///
/// # Errors
///
/// Returns an error if Arrow rejects the assembled columns.
pub fn table_to_record_batch(table: &Table) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.columns().len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns().len());

    for name in table.columns() {
        let values = table.column(name).unwrap_or_default();
        let dtype = table.column_type(name).unwrap_or(ColumnType::Null);
        let (data_type, array): (DataType, ArrayRef) = match dtype {
            ColumnType::Integer => (
                DataType::Int64,
                Arc::new(Int64Array::from(
                    values.iter().map(|v| v.as_i64()).collect::<Vec<_>>(),
                )),
            ),
            ColumnType::Float => (
                DataType::Float64,
                Arc::new(Float64Array::from(
                    values.iter().map(|v| v.as_f64()).collect::<Vec<_>>(),
                )),
            ),
            ColumnType::Boolean => (
                DataType::Boolean,
                Arc::new(BooleanArray::from(
                    values.iter().map(|v| v.as_bool()).collect::<Vec<_>>(),
                )),
            ),
            ColumnType::Text | ColumnType::Null | ColumnType::Json | ColumnType::Mixed => (
                DataType::Utf8,
                Arc::new(StringArray::from(
                    values.iter().map(|v| text_cell(v)).collect::<Vec<_>>(),
                )),
            ),
        };
        fields.push(Field::new(name, data_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let options = RecordBatchOptions::new().with_row_count(Some(table.len()));
    RecordBatch::try_new_with_options(schema, arrays, &options)
        .context("assemble RecordBatch from table")
}

/// Write a table to one Parquet file, creating parent directories if needed.
///
/// # Returns
/// Number of rows written.
///
/// # Errors
/// An error is returned if conversion, file creation, or writing fails.
pub fn write_table_parquet(
    path: impl AsRef<Path>,
    table: &Table,
    compression: ParquetCompression,
) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }

    let batch = table_to_record_batch(table)?;

    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(compression.codec())
        .build();
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(props)).context("create ArrowWriter")?;
    writer.write(&batch).context("write batch to parquet")?;
    writer.close().context("close ArrowWriter")?;

    Ok(table.len())
}

/// Read a Parquet file into a typed `Vec<T>`.
///
/// # Errors
/// Returns an error if the file cannot be opened, the reader cannot be built,
/// batch iteration fails, or conversion to `T` fails.
pub fn read_parquet_vec<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;

    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("open ParquetRecordBatchReader")?;
    let reader = builder
        .with_batch_size(64 * 1024)
        .build()
        .context("build ParquetRecordBatchReader")?;

    let mut out: Vec<T> = Vec::new();
    for batch in reader {
        let batch = batch.context("read next batch")?;
        let mut rows: Vec<T> =
            from_record_batch(&batch).context("deserialize RecordBatch rows to T")?;
        out.append(&mut rows);
    }
    Ok(out)
}

fn text_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
