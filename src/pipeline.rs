//! End-to-end run: source → engine → reporter → sink.
//!
//! Each stage completes before the next starts. A run stops early, without
//! touching later stages, when the source yields nothing or no row survives
//! validation. Sink and report-writing failures are returned as errors.

use crate::quality::{generate_report, save_report, QualityReport, DEFAULT_KEY_COLUMN};
use crate::sink::{SaveOutcome, TableSink};
use crate::source::RecordSource;
use crate::transform::Transformer;
use crate::validation::ErrorCollector;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The source returned no records.
    NoRecords,
    /// Records were fetched but none survived cleaning and validation.
    NoValidRows { fetched: usize },
    Completed(RunSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub fetched: usize,
    pub valid: usize,
    pub rejected: usize,
    pub output: SaveOutcome,
    pub report: QualityReport,
    pub report_path: PathBuf,
}

pub struct Pipeline<'a> {
    source: &'a dyn RecordSource,
    transformer: Transformer,
    sink: &'a dyn TableSink,
    report_path: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        source: &'a dyn RecordSource,
        transformer: Transformer,
        sink: &'a dyn TableSink,
        report_path: impl AsRef<Path>,
    ) -> Self {
        Self {
            source,
            transformer,
            sink,
            report_path: report_path.as_ref().to_path_buf(),
        }
    }

    /// Run the batch once.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be built or written, or the sink fails.
    pub fn run(&self) -> Result<RunOutcome> {
        let raw = self.source.fetch();
        if raw.is_empty() {
            error!("No data extracted. Exiting.");
            return Ok(RunOutcome::NoRecords);
        }

        let mut rejected = ErrorCollector::new();
        let table = self.transformer.transform_with_errors(&raw, &mut rejected);
        for row in rejected.errors() {
            debug!("Rejected {row}");
        }
        for (code, count) in rejected.count_by_code() {
            info!("Rejected {count} rows: {code}");
        }
        if table.is_empty() {
            error!("No data after transformation. Exiting.");
            return Ok(RunOutcome::NoValidRows { fetched: raw.len() });
        }

        let report = generate_report(&table, DEFAULT_KEY_COLUMN)?;

        let output = self.sink.save(&table)?;
        info!("Pipeline complete. Data saved to {}", output.location.display());

        save_report(&report, &self.report_path)?;
        info!("Data quality report written to {}", self.report_path.display());

        Ok(RunOutcome::Completed(RunSummary {
            fetched: raw.len(),
            valid: table.len(),
            rejected: rejected.error_count(),
            output,
            report,
            report_path: self.report_path.clone(),
        }))
    }
}
