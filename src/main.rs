//! postflow: fetch posts from a JSON API, clean them, write Parquet and a
//! data-quality report.
//!
//! All settings come from environment variables (optionally loaded from a
//! `.env` file). A run that finds nothing to write exits successfully.

use anyhow::{Context, Result};
use clap::Parser;
use postflow::config::{load_env_file, DEFAULT_ENV_FILE};
use postflow::logging::{self, LogSettings};
use postflow::{Config, ParquetSink, Pipeline, RunOutcome};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "postflow", version, about, long_about = None)]
struct Cli {
    /// Load environment variables from this file instead of `./.env`
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Override OUTPUT_DIR
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => load_env_file(path, true)?,
        None => load_env_file(Path::new(DEFAULT_ENV_FILE), false)?,
    };

    let mut config = Config::from_env().context("read configuration")?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let settings = LogSettings {
        level: match cli.verbose {
            0 => config.log_level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        },
        ..config.log_settings()
    };
    let _guard = logging::init(&settings)?;

    let source = config.source();
    let sink = build_sink(&config)?;
    let pipeline = Pipeline::new(&source, config.transformer(), &sink, config.report_path());

    match pipeline.run()? {
        RunOutcome::Completed(summary) => info!(
            fetched = summary.fetched,
            valid = summary.valid,
            rejected = summary.rejected,
            "run finished"
        ),
        RunOutcome::NoRecords | RunOutcome::NoValidRows { .. } => {}
    }
    Ok(())
}

#[cfg(feature = "object-store-s3")]
fn build_sink(config: &Config) -> Result<ParquetSink> {
    ParquetSink::from_config(config.sink_config())
}

#[cfg(not(feature = "object-store-s3"))]
fn build_sink(config: &Config) -> Result<ParquetSink> {
    if config.use_s3 {
        anyhow::bail!("USE_S3 is set but postflow was built without the object-store-s3 feature");
    }
    Ok(ParquetSink::new(config.sink_config()))
}
