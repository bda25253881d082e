//! Logging setup.
//!
//! The crate logs through `tracing` macros only. Nothing is printed until the
//! binary calls [`init`] once at start-up, which installs a stderr layer and,
//! optionally, a plain-text file layer. `RUST_LOG` overrides the configured
//! level.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Default filter directive, e.g. `info` or `postflow=debug`.
    pub level: String,
    /// Append log lines here as well as to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Keeps the file writer alive; dropping it flushes pending lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file directory cannot be created or a global
/// subscriber is already installed.
pub fn init(settings: &LogSettings) -> Result<LogGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter(&settings.level));

    let (file_layer, guard) = match &settings.log_file {
        Some(path) => {
            let (dir, name) = split_log_path(path);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("mkdir -p {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(&dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter(&settings.level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("install tracing subscriber")?;

    Ok(LogGuard { _file: guard })
}

fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .map_or_else(|| "app.log".to_string(), |n| n.to_string_lossy().into_owned());
    (dir, name)
}
