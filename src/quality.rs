//! Data-quality report over a validated table.
//!
//! [`generate_report`] computes structural metrics (row count, nulls, column
//! types, duplicate keys) and numeric summaries of the derived columns.
//! [`save_report`] writes the result as indented JSON.

use crate::stats::{describe, NumericSummary};
use crate::table::{key_text, ColumnType, Table};
use crate::transform::{BODY_WORD_COUNT_COLUMN, ID_COLUMN, TITLE_LENGTH_COLUMN};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// File name of the report inside the output directory.
pub const REPORT_FILENAME: &str = "data_quality_report.json";

/// Default key column for duplicate detection.
pub const DEFAULT_KEY_COLUMN: &str = ID_COLUMN;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub record_count: usize,
    pub column_nulls: BTreeMap<String, usize>,
    pub column_null_ratios: BTreeMap<String, f64>,
    pub column_types: BTreeMap<String, String>,
    /// Rows whose key already appeared in an earlier row.
    pub duplicate_key_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_length_summary: Option<NumericSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_word_count_summary: Option<NumericSummary>,
}

/// Build a quality report for `table`, using `key_column` for duplicate
/// detection.
///
/// # Errors
///
/// Returns an error if `table` has rows but no `key_column`.
#[allow(clippy::cast_precision_loss)]
pub fn generate_report(table: &Table, key_column: &str) -> Result<QualityReport> {
    let mut report = QualityReport {
        record_count: table.len(),
        ..QualityReport::default()
    };

    for column in table.columns() {
        let nulls = table.null_count(column).unwrap_or(0);
        let ratio = if table.is_empty() {
            0.0
        } else {
            nulls as f64 / table.len() as f64
        };
        let dtype = table.column_type(column).unwrap_or(ColumnType::Null);

        report.column_nulls.insert(column.clone(), nulls);
        report.column_null_ratios.insert(column.clone(), ratio);
        report.column_types.insert(column.clone(), dtype.to_string());
    }

    report.duplicate_key_count = match table.column(key_column) {
        Some(keys) => count_repeated(&keys),
        None if table.is_empty() => 0,
        None => bail!("key column '{key_column}' not found in table"),
    };

    report.title_length_summary = numeric_summary(table, TITLE_LENGTH_COLUMN);
    report.body_word_count_summary = numeric_summary(table, BODY_WORD_COUNT_COLUMN);

    Ok(report)
}

/// Write `report` as 2-space indented JSON, replacing any existing file.
/// Creates parent directories if needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or written.
pub fn save_report(report: &QualityReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, report)
        .with_context(|| format!("serialize quality report to {}", path.display()))?;
    w.write_all(b"\n")?;
    w.flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

/// Rows beyond the first occurrence of each key.
fn count_repeated(keys: &[&Value]) -> usize {
    let mut seen = HashSet::new();
    keys.iter().filter(|k| !seen.insert(key_text(k))).count()
}

fn numeric_summary(table: &Table, column: &str) -> Option<NumericSummary> {
    let values: Vec<f64> = table
        .column(column)?
        .into_iter()
        .filter_map(Value::as_f64)
        .collect();
    Some(describe(&values))
}
