//! Run configuration, read once from the environment.
//!
//! [`Config::from_env`] reads the process environment (load a `.env` file with
//! [`load_env_file`] first if you want one). [`Config::from_lookup`] takes any lookup
//! function instead, which keeps tests away from global state. The rest of the
//! crate only ever sees the plain values produced here.

use crate::io::parquet::ParquetCompression;
use crate::logging::LogSettings;
use crate::quality::REPORT_FILENAME;
use crate::sink::{SinkConfig, DEFAULT_FILENAME};
use crate::source::{HttpSource, DEFAULT_TIMEOUT};
use crate::transform::{Transformer, DEFAULT_MAX_TITLE_LEN};
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_OUTPUT_DIR: &str = "data/output";
pub const DEFAULT_LOG_FILE: &str = "app.log";
pub const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub api_user_id: Option<String>,
    pub request_timeout: Duration,
    pub max_title_len: usize,
    pub output_dir: PathBuf,
    pub output_filename: String,
    pub partition_cols: Vec<String>,
    pub compression: ParquetCompression,
    pub use_s3: bool,
    pub s3_bucket: Option<String>,
    pub s3_prefix: String,
    pub aws_region: Option<String>,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_base_url = get("API_BASE_URL").ok_or(ConfigError::Missing("API_BASE_URL"))?;

        let request_timeout = match get("API_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("API_TIMEOUT_SECS", &raw)?),
            None => DEFAULT_TIMEOUT,
        };
        let max_title_len = match get("MAX_TITLE_LEN") {
            Some(raw) => parse_number("MAX_TITLE_LEN", &raw)?,
            None => DEFAULT_MAX_TITLE_LEN,
        };
        let compression = match get("PARQUET_COMPRESSION") {
            Some(raw) => raw.parse::<ParquetCompression>().map_err(|reason| ConfigError::Invalid {
                var: "PARQUET_COMPRESSION",
                value: raw.clone(),
                reason,
            })?,
            None => ParquetCompression::default(),
        };
        let use_s3 = match get("USE_S3") {
            Some(raw) => parse_bool("USE_S3", &raw)?,
            None => false,
        };
        let s3_bucket = get("AWS_S3_BUCKET");
        if use_s3 && s3_bucket.is_none() {
            return Err(ConfigError::Missing("AWS_S3_BUCKET"));
        }

        // LOG_FILE set to an empty string disables file logging.
        let log_file = match lookup("LOG_FILE") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(PathBuf::from(v.trim())),
            None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        };

        Ok(Self {
            api_base_url,
            api_user_id: get("API_USER_ID"),
            request_timeout,
            max_title_len,
            output_dir: get("OUTPUT_DIR").map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from),
            output_filename: get("OUTPUT_FILENAME").unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            partition_cols: get("PARTITION_COLS")
                .map(|raw| parse_list(&raw))
                .unwrap_or_default(),
            compression,
            use_s3,
            s3_bucket,
            s3_prefix: get("S3_PREFIX").unwrap_or_default(),
            aws_region: get("AWS_REGION"),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_file,
        })
    }

    #[must_use]
    pub fn source(&self) -> HttpSource {
        HttpSource::new(self.api_base_url.clone(), self.api_user_id.clone())
            .with_timeout(self.request_timeout)
    }

    #[must_use]
    pub const fn transformer(&self) -> Transformer {
        Transformer::new(self.max_title_len)
    }

    #[must_use]
    pub fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            output_dir: self.output_dir.clone(),
            filename: self.output_filename.clone(),
            partition_cols: self.partition_cols.clone(),
            compression: self.compression,
            use_object_store: self.use_s3,
            bucket: self.s3_bucket.clone(),
            prefix: self.s3_prefix.clone(),
            region: self.aws_region.clone(),
        }
    }

    #[must_use]
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }

    /// Where the quality report is written.
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILENAME)
    }
}

/// Load variables from a dotenv file into the process environment. Variables
/// already set are kept.
///
/// Returns whether a file was loaded. A missing file is only an error when
/// `required` is set.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if it is
/// missing and `required` is set.
pub fn load_env_file(path: &Path, required: bool) -> anyhow::Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() && !required => Ok(false),
        Err(e) => Err(e).with_context(|| format!("load {}", path.display())),
    }
}

/// Normalize a boolean flag: `1/true/yes/on` and `0/false/no/off/""`,
/// case-insensitive.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for anything else.
pub fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "expected a boolean (true/false, yes/no, on/off, 1/0)".to_string(),
        }),
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks.
#[must_use]
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_number<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
