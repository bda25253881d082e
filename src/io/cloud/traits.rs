//! Core types for object-storage I/O.
//!
//! The interface is synchronous; implementations backed by async SDKs run
//! them on a private runtime.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

// ============================================================================
// Core Error Type
// ============================================================================

/// Generic error type for cloud IO operations
#[derive(Debug, Clone)]
pub struct CloudIOError {
    pub message: String,
    pub kind: ErrorKind,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Authorization,
    NotFound,
    InvalidInput,
    Network,
    Timeout,
    ServiceUnavailable,
    InternalError,
    Other,
}

impl fmt::Display for CloudIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl Error for CloudIOError {}

impl CloudIOError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

pub type CloudResult<T> = Result<T, CloudIOError>;

// ============================================================================
// ObjectIO - Object Storage
// ============================================================================

/// Metadata for an object in storage
#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<i64>, // Unix timestamp
    pub etag: Option<String>,
    pub custom_metadata: HashMap<String, String>,
}

/// Trait for object storage operations
pub trait ObjectIO: Send + Sync {
    /// Upload data to object storage, replacing any existing object
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket doesn't exist, permissions are not enough, or the upload fails
    fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> CloudResult<()>;

    /// Download data from object storage
    ///
    /// # Errors
    ///
    /// Returns an error if the object doesn't exist, permissions are not enough, or the download fails
    fn get_object(&self, bucket: &str, key: &str) -> CloudResult<Vec<u8>>;

    /// List objects with a prefix, sorted by key
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket doesn't exist, permissions are not enough, or the listing fails
    fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> CloudResult<Vec<ObjectMetadata>>;

    /// Check if an object exists
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket doesn't exist, permissions are not enough, or the check fails
    fn object_exists(&self, bucket: &str, key: &str) -> CloudResult<bool>;
}
