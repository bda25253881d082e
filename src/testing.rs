//! Test helpers for code built on postflow.
//!
//! - **Fixtures**: sample API records and a `record` builder ([`fixtures`])
//! - **Doubles**: a [`StaticSource`] that returns canned records and a
//!   [`RecordingSink`] that remembers what it was asked to save ([`doubles`])
//! - **Temp paths**: self-cleaning scratch directories ([`mock_io`])
//!
//! # Quick Start
//!
//! ```
//! use postflow::testing::*;
//! use postflow::{Pipeline, RunOutcome, Transformer};
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = TempDirPath::new()?;
//! let source = StaticSource::new(Vec::new());
//! let sink = RecordingSink::new();
//! let outcome = Pipeline::new(&source, Transformer::default(), &sink, dir.path().join("r.json")).run()?;
//!
//! assert_eq!(outcome, RunOutcome::NoRecords);
//! assert_eq!(sink.save_count(), 0);
//! # Ok(())
//! # }
//! ```

pub mod doubles;
pub mod fixtures;
pub mod mock_io;

pub use doubles::*;
pub use fixtures::*;
pub use mock_io::*;
