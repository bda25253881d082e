//! Stand-ins for the pipeline's external collaborators.

use crate::sink::{SaveOutcome, TableSink};
use crate::source::RecordSource;
use crate::table::{Record, Table};
use anyhow::{bail, Result};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;

/// A [`RecordSource`] returning the same records on every fetch.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<Record>,
    fetches: Cell<usize>,
}

impl StaticSource {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            fetches: Cell::new(0),
        }
    }

    /// How many times [`RecordSource::fetch`] was called.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl RecordSource for StaticSource {
    fn fetch(&self) -> Vec<Record> {
        self.fetches.set(self.fetches.get() + 1);
        self.records.clone()
    }
}

/// A [`TableSink`] that keeps every table it is given instead of writing it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    saved: RefCell<Vec<Table>>,
    fail_with: Option<String>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every save fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            saved: RefCell::default(),
            fail_with: Some(message.into()),
        }
    }

    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saved.borrow().len()
    }

    /// Tables saved so far, oldest first.
    #[must_use]
    pub fn saved(&self) -> Vec<Table> {
        self.saved.borrow().clone()
    }
}

impl TableSink for RecordingSink {
    fn save(&self, table: &Table) -> Result<SaveOutcome> {
        if let Some(message) = &self.fail_with {
            bail!("{message}");
        }
        self.saved.borrow_mut().push(table.clone());
        Ok(SaveOutcome {
            location: PathBuf::from("memory://table"),
            files: Vec::new(),
            uploaded: Vec::new(),
        })
    }
}
