//! Row-level validation errors and the collector the engine fills in.
//!
//! The engine never fails on bad rows; it drops them. When asked, it records
//! why each row was dropped in an [`ErrorCollector`] so the run can report
//! rejection counts per reason.
//!
//! # Example
//!
//! ```
//! use postflow::validation::*;
//!
//! let mut collector = ErrorCollector::new();
//! let result = combine_validations(vec![
//!     validators::not_empty("title", ""),
//!     validators::not_empty("body", "some text"),
//! ]);
//! if let Err(errors) = result {
//!     collector.add_error(Some("7".into()), errors);
//! }
//! assert_eq!(collector.error_count(), 1);
//! assert_eq!(collector.count_by_code().get("empty"), Some(&1));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Result type for validation operations.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The field that failed validation (optional)
    pub field: Option<String>,
    /// Human-readable error message
    pub message: String,
    /// Error code for categorization (optional)
    pub code: Option<String>,
}

impl ValidationError {
    /// Create a validation error for a specific field.
    pub fn field<S: Into<String>, M: Into<String>>(field: S, message: M) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
            code: None,
        }
    }

    /// Attach an error code.
    #[must_use]
    pub fn with_code<S: Into<String>>(mut self, code: S) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref field) = self.field {
            write!(f, "[{}] {}", field, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(ref code) = self.code {
            write!(f, " (code: {})", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The validation errors of one rejected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    /// Key of the rejected row, if it had one
    pub record_id: Option<String>,
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.record_id.as_deref().unwrap_or("?");
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "record {id}: {joined}")
    }
}

/// Collects rejected rows for reporting after a transform.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    errors: Vec<RecordError>,
}

impl ErrorCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rejected row.
    pub fn add_error(&mut self, record_id: Option<String>, errors: Vec<ValidationError>) {
        self.errors.push(RecordError { record_id, errors });
    }

    /// Number of rejected rows.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[RecordError] {
        &self.errors
    }

    /// Number of errors per code. Errors without a code count under `"other"`.
    ///
    /// A row rejected for two reasons counts once under each.
    #[must_use]
    pub fn count_by_code(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.errors {
            for e in &record.errors {
                let code = e.code.clone().unwrap_or_else(|| "other".to_string());
                *counts.entry(code).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl fmt::Display for ErrorCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCollector({} errors)", self.error_count())
    }
}

/// Validators for common field rules.
pub mod validators {
    use super::{ValidationError, ValidationResult};

    /// Validate that a string is not empty.
    pub fn not_empty(field: &str, value: &str) -> ValidationResult {
        if value.is_empty() {
            Err(vec![
                ValidationError::field(field, "must not be empty").with_code("empty"),
            ])
        } else {
            Ok(())
        }
    }

    /// Validate that a key occurs only once in its table.
    pub fn unique_key(field: &str, occurrences: usize) -> ValidationResult {
        if occurrences > 1 {
            Err(vec![
                ValidationError::field(field, format!("duplicate key ({occurrences} rows)"))
                    .with_code("duplicate"),
            ])
        } else {
            Ok(())
        }
    }
}

/// Combine multiple validation results.
pub fn combine_validations(results: Vec<ValidationResult>) -> ValidationResult {
    let mut all_errors = Vec::new();
    for result in results {
        if let Err(mut errors) = result {
            all_errors.append(&mut errors);
        }
    }
    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors)
    }
}
