//! # Postflow
//!
//! A **batch ETL pipeline** that pulls JSON records from an HTTP API, cleans
//! and validates them, writes them out as Parquet (optionally partitioned and
//! mirrored to S3), and records a data-quality report for every run.
//!
//! ## Key Features
//!
//! - **Tolerant extraction** - any network or format failure becomes "no data"
//! - **Deterministic cleaning** - trimmed, truncated, capitalized titles and
//!   whitespace-collapsed bodies, plus derived length and word-count columns
//! - **Validation with reasons** - rows with blank text or non-unique keys are
//!   dropped and counted per rule
//! - **Parquet output** - one file, or a Hive-style `col=value/` tree
//! - **Object storage** - upload everything that was written under a key prefix
//! - **Quality report** - null counts, column types, duplicate keys and
//!   numeric summaries as pretty-printed JSON
//!
//! ## Quick Start
//!
//! ```no_run
//! use postflow::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let source = HttpSource::new("https://jsonplaceholder.typicode.com/posts", None);
//! let sink = ParquetSink::new(SinkConfig::default());
//! let pipeline = Pipeline::new(
//!     &source,
//!     Transformer::default(),
//!     &sink,
//!     "data/output/data_quality_report.json",
//! );
//!
//! match pipeline.run()? {
//!     RunOutcome::Completed(summary) => println!("kept {} rows", summary.valid),
//!     other => println!("nothing written: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Table
//!
//! A [`Table`] is an ordered set of named columns over rows of JSON values.
//! Each column has an inferred [`ColumnType`]; that tag drives both the
//! quality report and the Parquet schema.
//!
//! ### Stages
//!
//! - [`RecordSource`] - yields one batch of raw records ([`HttpSource`])
//! - [`Transformer`] - cleans, derives and filters into a [`Table`]
//! - [`generate_report`] / [`save_report`] - describe the validated table
//! - [`TableSink`] - persists it ([`ParquetSink`])
//!
//! [`Pipeline`] wires the stages together and returns a [`RunOutcome`].
//!
//! ### Configuration
//!
//! [`Config::from_env`] reads every setting from environment variables; the
//! `postflow` binary loads a `.env` file first and installs logging with
//! [`logging::init`].
//!
//! ## Testing
//!
//! The [`testing`] module has canned sources and sinks, sample records and
//! scratch-directory helpers. Uploads can be exercised without a network
//! through [`io::cloud::FakeObjectIO`].
//!
//! ## Feature Flags
//!
//! - `object-store-s3` (default): real S3 uploads through `object_store`

pub mod config;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod quality;
pub mod sink;
pub mod source;
pub mod stats;
pub mod table;
pub mod testing;
pub mod transform;
pub mod validation;

pub use config::{Config, ConfigError};
pub use io::parquet::{read_parquet_vec, write_table_parquet, ParquetCompression};
pub use io::partition::write_partitioned;
pub use pipeline::{Pipeline, RunOutcome, RunSummary};
pub use quality::{generate_report, save_report, QualityReport};
pub use sink::{ParquetSink, SaveOutcome, SinkConfig, TableSink};
pub use source::{FetchError, HttpSource, RecordSource};
pub use stats::NumericSummary;
pub use table::{ColumnType, Record, Table};
pub use transform::Transformer;
pub use validation::{ErrorCollector, ValidationError};
