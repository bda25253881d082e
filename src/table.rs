//! In-memory table used between the engine, the reporter and the sink.
//!
//! A [`Table`] is an ordered list of rows ([`Record`]s) plus an explicit,
//! ordered column list. Every row carries every column; a key missing from an
//! input record is stored as JSON `null`. Column storage types are not
//! declared up front but inferred on demand from the values ([`ColumnType`]).

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// One flat mapping of field name to value.
pub type Record = Map<String, Value>;

/// Inferred storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// No non-null values.
    Null,
    Boolean,
    Integer,
    Float,
    Text,
    /// Arrays or objects.
    Json,
    /// More than one of the kinds above.
    Mixed,
}

impl ColumnType {
    /// Stable display name used in quality reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Json => "json",
            Self::Mixed => "mixed",
        }
    }

    /// Kind of a single non-null value.
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Boolean),
            Value::Number(n) if n.is_i64() => Some(Self::Integer),
            Value::Number(_) => Some(Self::Float),
            Value::String(_) => Some(Self::Text),
            Value::Array(_) | Value::Object(_) => Some(Self::Json),
        }
    }

    /// Widen `self` so it also covers `other`.
    fn unify(self, other: Self) -> Self {
        match (self, other) {
            (Self::Null, t) | (t, Self::Null) => t,
            (a, b) if a == b => a,
            (Self::Integer, Self::Float) | (Self::Float, Self::Integer) => Self::Float,
            _ => Self::Mixed,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical text of a value, used wherever values act as keys.
///
/// Numbers compare by value, so `1` and `1.0` share a key; `1` and `"1"`
/// do not.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn key_text(value: &Value) -> String {
    if let Value::Number(n) = value
        && !n.is_i64()
        && !n.is_u64()
        && let Some(f) = n.as_f64()
        && f.is_finite()
        && f.fract() == 0.0
        && f >= i64::MIN as f64
        && f < i64::MAX as f64
    {
        return (f as i64).to_string();
    }
    value.to_string()
}

/// An ordered sequence of rows with an explicit column list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    /// Build a table from raw records.
    ///
    /// Columns appear in first-seen order across all records. Rows missing a
    /// column get `null` for it.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| (c.clone(), record.get(c).cloned().unwrap_or(Value::Null)))
                    .collect::<Record>()
            })
            .collect();

        Self { columns, rows }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Values of one column in row order, or `None` if the column is unknown.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        if !self.has_column(name) {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.get(name).unwrap_or(&Value::Null))
                .collect(),
        )
    }

    /// Inferred storage type of a column.
    #[must_use]
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        let values = self.column(name)?;
        Some(
            values
                .into_iter()
                .filter_map(ColumnType::of)
                .fold(ColumnType::Null, ColumnType::unify),
        )
    }

    /// Number of `null` values in a column.
    #[must_use]
    pub fn null_count(&self, name: &str) -> Option<usize> {
        self.column(name)
            .map(|values| values.into_iter().filter(|v| v.is_null()).count())
    }

    /// Replace (or append) a column, computing each cell from its row.
    pub fn set_column<F>(&mut self, name: &str, mut f: F)
    where
        F: FnMut(&Record) -> Value,
    {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
        for row in &mut self.rows {
            let v = f(row);
            row.insert(name.to_string(), v);
        }
    }

    /// Keep only the rows matching `keep`, preserving order.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Record) -> bool,
    {
        self.rows.retain(keep);
    }

    /// Copy of the table without the named columns.
    #[must_use]
    pub fn without_columns(&self, drop: &[String]) -> Self {
        let columns: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !drop.contains(c))
            .cloned()
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|(k, _)| !drop.contains(k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Split rows into groups sharing the same values for `by`.
    ///
    /// Groups are returned in first-seen order; each carries the key values
    /// (one per column in `by`) and the matching rows with every column kept.
    /// Returns `None` if any column in `by` is unknown.
    #[must_use]
    pub fn group_by(&self, by: &[String]) -> Option<Vec<(Vec<Value>, Self)>> {
        if by.iter().any(|c| !self.has_column(c)) {
            return None;
        }

        let mut index: HashMap<Vec<String>, usize> = HashMap::new();
        let mut groups: Vec<(Vec<Value>, Self)> = Vec::new();
        for row in &self.rows {
            let values: Vec<Value> = by
                .iter()
                .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                .collect();
            let key: Vec<String> = values.iter().map(key_text).collect();
            let slot = *index.entry(key).or_insert_with(|| {
                groups.push((
                    values,
                    Self {
                        columns: self.columns.clone(),
                        rows: Vec::new(),
                    },
                ));
                groups.len() - 1
            });
            groups[slot].1.rows.push(row.clone());
        }
        Some(groups)
    }
}
