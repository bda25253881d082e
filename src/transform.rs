//! Cleaning and validation engine.
//!
//! [`Transformer::transform`] turns raw records into a validated [`Table`]:
//!
//! 1. `title` is cleaned with [`Transformer::clean_title`], `body` with
//!    [`Transformer::clean_body`].
//! 2. Derived fields `title_length` and `body_word_count` are computed from
//!    the cleaned text.
//! 3. Rows with an empty cleaned title or body are dropped, then every row
//!    whose `id` is shared with another surviving row is dropped. Duplicate
//!    keys exclude all of their rows, not just the extras.
//!
//! The engine is a pure function of its input: malformed rows are cleaned to
//! empty text and filtered out, never reported as errors.

use crate::table::{key_text, Record, Table};
use crate::validation::{combine_validations, validators, ErrorCollector};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Default maximum title length used by the pipeline.
pub const DEFAULT_MAX_TITLE_LEN: usize = 100;

pub const ID_COLUMN: &str = "id";
pub const TITLE_COLUMN: &str = "title";
pub const BODY_COLUMN: &str = "body";
pub const TITLE_LENGTH_COLUMN: &str = "title_length";
pub const BODY_WORD_COUNT_COLUMN: &str = "body_word_count";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transformer {
    max_title_len: usize,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TITLE_LEN)
    }
}

impl Transformer {
    #[must_use]
    pub const fn new(max_title_len: usize) -> Self {
        Self { max_title_len }
    }

    #[must_use]
    pub const fn max_title_len(&self) -> usize {
        self.max_title_len
    }

    /// Trim, truncate to `max_title_len` characters, and uppercase the first
    /// character. Non-text input yields an empty string.
    ///
    /// The result never exceeds `max_title_len` characters, even when the
    /// uppercase form of the first character is longer (`ß` → `SS`).
    #[must_use]
    pub fn clean_title(&self, value: &Value) -> String {
        let Some(text) = value.as_str() else {
            return String::new();
        };
        let mut chars = text.trim().chars().take(self.max_title_len);
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars)
                .take(self.max_title_len)
                .collect(),
            None => String::new(),
        }
    }

    /// Trim and collapse every whitespace run into one space. Non-text input
    /// yields an empty string.
    #[must_use]
    pub fn clean_body(&self, value: &Value) -> String {
        let Some(text) = value.as_str() else {
            return String::new();
        };
        WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
    }

    /// Add `title_length` (characters in `title`) and `body_word_count`
    /// (whitespace-separated tokens in `body`) to every row.
    ///
    /// Non-text cells count as empty.
    pub fn add_derived_fields(&self, table: &mut Table) {
        table.set_column(TITLE_LENGTH_COLUMN, |row| {
            Value::from(text_of(row, TITLE_COLUMN).chars().count())
        });
        table.set_column(BODY_WORD_COUNT_COLUMN, |row| {
            Value::from(text_of(row, BODY_COLUMN).split_whitespace().count())
        });
    }

    /// Drop rows with an empty title or body, then drop every row whose `id`
    /// appears more than once among the rest.
    #[must_use]
    pub fn filter_valid(&self, table: Table) -> Table {
        let mut ignored = ErrorCollector::new();
        self.filter_valid_with_errors(table, &mut ignored)
    }

    /// [`filter_valid`](Self::filter_valid), recording each dropped row.
    #[must_use]
    pub fn filter_valid_with_errors(&self, mut table: Table, errors: &mut ErrorCollector) -> Table {
        table.retain(|row| {
            let checks = combine_validations(vec![
                validators::not_empty(TITLE_COLUMN, text_of(row, TITLE_COLUMN)),
                validators::not_empty(BODY_COLUMN, text_of(row, BODY_COLUMN)),
            ]);
            match checks {
                Ok(()) => true,
                Err(e) => {
                    errors.add_error(Some(row_key(row)), e);
                    false
                }
            }
        });

        let mut occurrences: HashMap<String, usize> = HashMap::new();
        for row in table.rows() {
            *occurrences.entry(row_key(row)).or_insert(0) += 1;
        }

        table.retain(|row| {
            let key = row_key(row);
            let n = occurrences.get(&key).copied().unwrap_or(0);
            match validators::unique_key(ID_COLUMN, n) {
                Ok(()) => true,
                Err(e) => {
                    errors.add_error(Some(key), e);
                    false
                }
            }
        });
        table
    }

    /// Clean, derive and filter a batch of raw records.
    #[must_use]
    pub fn transform(&self, records: &[Record]) -> Table {
        let mut ignored = ErrorCollector::new();
        self.transform_with_errors(records, &mut ignored)
    }

    /// [`transform`](Self::transform), recording each dropped row.
    #[must_use]
    pub fn transform_with_errors(&self, records: &[Record], errors: &mut ErrorCollector) -> Table {
        info!("Starting transformation of {} records", records.len());
        if records.is_empty() {
            info!("Transformation complete. 0 records remain.");
            return Table::default();
        }

        let mut table = Table::from_records(records);
        table.set_column(TITLE_COLUMN, |row| {
            Value::String(self.clean_title(row.get(TITLE_COLUMN).unwrap_or(&Value::Null)))
        });
        table.set_column(BODY_COLUMN, |row| {
            Value::String(self.clean_body(row.get(BODY_COLUMN).unwrap_or(&Value::Null)))
        });
        self.add_derived_fields(&mut table);

        let before = errors.error_count();
        let table = self.filter_valid_with_errors(table, errors);
        debug!(
            rejected = errors.error_count() - before,
            "rows dropped by validity filter"
        );

        info!("Transformation complete. {} records remain.", table.len());
        table
    }
}

fn text_of<'a>(row: &'a Record, column: &str) -> &'a str {
    row.get(column).and_then(Value::as_str).unwrap_or("")
}

fn row_key(row: &Record) -> String {
    key_text(row.get(ID_COLUMN).unwrap_or(&Value::Null))
}
