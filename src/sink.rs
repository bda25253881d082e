//! Persisting the validated table.
//!
//! [`ParquetSink`] writes the table locally, either as one Parquet file or as
//! a partitioned tree, and then, when object storage is enabled, uploads
//! every written file under the configured prefix. Nothing here is retried
//! or rolled back: the first failure is returned to the caller.

use crate::io::cloud::helpers::{normalize_prefix, object_key, upload_file, validate_bucket_name};
use crate::io::cloud::ObjectIO;
use crate::io::parquet::{write_table_parquet, ParquetCompression};
use crate::io::partition::write_partitioned;
use crate::table::Table;
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Default file name for unpartitioned output.
pub const DEFAULT_FILENAME: &str = "posts.parquet";

/// Directory (under the output directory) holding partitioned output.
pub const PARTITIONED_DIR: &str = "partitioned";

/// Anything that can persist a validated table.
pub trait TableSink {
    /// Persist `table`.
    ///
    /// # Errors
    ///
    /// Returns an error on any local write or upload failure.
    fn save(&self, table: &Table) -> Result<SaveOutcome>;
}

/// Where the sink writes and whether it mirrors to object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    pub output_dir: PathBuf,
    pub filename: String,
    pub partition_cols: Vec<String>,
    pub compression: ParquetCompression,
    pub use_object_store: bool,
    pub bucket: Option<String>,
    pub prefix: String,
    pub region: Option<String>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data/output"),
            filename: DEFAULT_FILENAME.to_string(),
            partition_cols: Vec::new(),
            compression: ParquetCompression::default(),
            use_object_store: false,
            bucket: None,
            prefix: String::new(),
            region: None,
        }
    }
}

/// What a save produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// The single file, or the root of the partitioned tree.
    pub location: PathBuf,
    /// Every local file written.
    pub files: Vec<PathBuf>,
    /// Object keys uploaded, in upload order.
    pub uploaded: Vec<String>,
}

pub struct ParquetSink {
    config: SinkConfig,
    store: Option<Box<dyn ObjectIO>>,
}

impl ParquetSink {
    /// A sink that writes locally only, whatever `config.use_object_store` says,
    /// until a store is attached with [`with_object_store`](Self::with_object_store).
    #[must_use]
    pub fn new(mut config: SinkConfig) -> Self {
        config.prefix = normalize_prefix(&config.prefix);
        Self {
            config,
            store: None,
        }
    }

    /// Build a sink from `config`, connecting to S3 when object storage is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if object storage is enabled without a valid bucket,
    /// or the client cannot be built.
    #[cfg(feature = "object-store-s3")]
    pub fn from_config(config: SinkConfig) -> Result<Self> {
        let sink = Self::new(config);
        if !sink.config.use_object_store {
            return Ok(sink);
        }
        let bucket = sink.bucket()?.to_string();
        let store = crate::io::cloud::S3ObjectIO::new(&bucket, sink.config.region.as_deref())
            .with_context(|| format!("connect to bucket {bucket}"))?;
        Ok(sink.with_object_store(Box::new(store)))
    }

    /// Attach the store used for uploads when object storage is enabled.
    #[must_use]
    pub fn with_object_store(mut self, store: Box<dyn ObjectIO>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &SinkConfig {
        &self.config
    }

    fn bucket(&self) -> Result<&str> {
        let bucket = self
            .config
            .bucket
            .as_deref()
            .ok_or_else(|| anyhow!("object storage enabled but no bucket configured"))?;
        validate_bucket_name(bucket)?;
        Ok(bucket)
    }

    /// Store and bucket to upload to, or `None` when uploads are off.
    fn upload_target(&self) -> Result<Option<(&dyn ObjectIO, &str)>> {
        if !self.config.use_object_store {
            return Ok(None);
        }
        let bucket = self.bucket()?;
        let store = self
            .store
            .as_deref()
            .ok_or_else(|| anyhow!("object storage enabled but no client attached"))?;
        Ok(Some((store, bucket)))
    }

    fn save_single(&self, table: &Table) -> Result<SaveOutcome> {
        let target = self.upload_target()?;
        let path = self.config.output_dir.join(&self.config.filename);
        write_table_parquet(&path, table, self.config.compression)?;

        let mut outcome = SaveOutcome {
            location: path.clone(),
            files: vec![path.clone()],
            uploaded: Vec::new(),
        };

        match target {
            Some((store, bucket)) => {
                let key = object_key(&self.config.prefix, &self.config.filename);
                upload_file(store, bucket, &key, &path)
                    .with_context(|| format!("upload {} to s3://{bucket}/{key}", path.display()))?;
                info!("Uploaded {} to s3://{bucket}/{key}", self.config.filename);
                outcome.uploaded.push(key);
            }
            None => info!("Saved Parquet file to {}", path.display()),
        }
        Ok(outcome)
    }

    fn save_partitioned(&self, table: &Table) -> Result<SaveOutcome> {
        let target = self.upload_target()?;
        let root = self.config.output_dir.join(PARTITIONED_DIR);
        let parts = write_partitioned(
            &root,
            table,
            &self.config.partition_cols,
            self.config.compression,
        )?;
        info!(
            "Saved {} Parquet partitions to {}",
            parts.len(),
            root.display()
        );

        let mut outcome = SaveOutcome {
            location: root,
            files: parts.iter().map(|p| p.path.clone()).collect(),
            uploaded: Vec::new(),
        };

        if let Some((store, bucket)) = target {
            for part in &parts {
                let key = object_key(&self.config.prefix, &part.relative);
                upload_file(store, bucket, &key, &part.path).with_context(|| {
                    format!("upload {} to s3://{bucket}/{key}", part.path.display())
                })?;
                outcome.uploaded.push(key);
            }
            info!(
                "Uploaded Parquet partitions to s3://{bucket}/{}",
                self.config.prefix
            );
        }
        Ok(outcome)
    }
}

impl TableSink for ParquetSink {
    fn save(&self, table: &Table) -> Result<SaveOutcome> {
        let saved = if self.config.partition_cols.is_empty() {
            self.save_single(table)
        } else {
            self.save_partitioned(table)
        };
        saved.with_context(|| format!("save table to {}", self.config.output_dir.display()))
    }
}
