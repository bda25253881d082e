//! Hive-style partitioned Parquet layout.
//!
//! Rows are grouped by the partition columns; each distinct combination is
//! written to `<root>/<col1>=<v1>/<col2>=<v2>/part-00000.parquet` with the
//! partition columns removed from the file itself. Values are URL-encoded;
//! `null` maps to [`NULL_PARTITION`]. Two groups whose values render to the
//! same directory (e.g. `1` and `"1"`) are an error rather than a silent
//! overwrite.

use crate::io::parquet::{write_table_parquet, ParquetCompression};
use crate::table::Table;
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{create_dir_all, remove_dir_all};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name used for a `null` partition value.
pub const NULL_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// File name written in every partition leaf.
pub const PART_FILENAME: &str = "part-00000.parquet";

/// One written partition leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionFile {
    /// Path relative to the partition root, always `/`-separated.
    pub relative: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Directory segment for one partition column value.
#[must_use]
pub fn partition_segment(column: &str, value: &Value) -> String {
    let raw = match value {
        Value::Null => return format!("{column}={NULL_PARTITION}"),
        // Keep a literal string equal to the null marker apart from null.
        Value::String(s) if s == NULL_PARTITION => {
            return format!("{column}=%5F{}", &NULL_PARTITION[1..]);
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("{column}={}", urlencoding::encode(&raw))
}

/// Write `table` under `root`, one leaf per distinct combination of
/// `partition_cols`. Any existing `root` is removed first.
///
/// # Errors
///
/// Returns an error if a partition column is missing from the table, if two
/// distinct value combinations map to the same directory, or if any directory
/// or file operation fails. Nothing is written or removed in the first two
/// cases.
pub fn write_partitioned(
    root: impl AsRef<Path>,
    table: &Table,
    partition_cols: &[String],
    compression: ParquetCompression,
) -> Result<Vec<PartitionFile>> {
    let root = root.as_ref();
    let groups = table.group_by(partition_cols).ok_or_else(|| {
        let missing: Vec<&str> = partition_cols
            .iter()
            .filter(|c| !table.has_column(c))
            .map(String::as_str)
            .collect();
        anyhow!("partition column(s) not found in table: {}", missing.join(", "))
    })?;

    // Resolve every leaf before touching the disk.
    let mut seen = HashSet::with_capacity(groups.len());
    let mut plan = Vec::with_capacity(groups.len());
    for (values, rows) in groups {
        let segments: Vec<String> = partition_cols
            .iter()
            .zip(&values)
            .map(|(c, v)| partition_segment(c, v))
            .collect();
        let relative = format!("{}/{PART_FILENAME}", segments.join("/"));
        if !seen.insert(relative.clone()) {
            bail!(
                "partition values {} collide with an earlier partition at {relative}",
                Value::Array(values)
            );
        }
        let path = segments
            .iter()
            .fold(root.to_path_buf(), |p, s| p.join(s))
            .join(PART_FILENAME);
        plan.push((relative, path, rows));
    }

    if root.exists() {
        remove_dir_all(root).with_context(|| format!("rm -r {}", root.display()))?;
    }
    create_dir_all(root).with_context(|| format!("mkdir -p {}", root.display()))?;

    let mut written = Vec::with_capacity(plan.len());
    for (relative, path, rows) in plan {
        let leaf = rows.without_columns(partition_cols);
        let n = write_table_parquet(&path, &leaf, compression)?;
        debug!(partition = %relative, rows = n, "wrote partition");
        written.push(PartitionFile {
            relative,
            path,
            rows: n,
        });
    }
    Ok(written)
}
