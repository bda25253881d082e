//! Helpers for uploading local artifacts to object storage.
//!
//! - [`normalize_prefix`] - Strip surrounding `/` from a key prefix
//! - [`object_key`] - Join a prefix and a relative path into an object key
//! - [`validate_bucket_name`] - Reject obviously invalid bucket names
//! - [`validate_key_path`] - Reject empty or absolute keys
//! - [`upload_file`] - Read a local file and `put` it under a key

use crate::io::cloud::traits::{CloudIOError, CloudResult, ErrorKind, ObjectIO};
use std::path::Path;

/// Strip leading and trailing `/` from a key prefix.
#[must_use]
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_matches('/').to_string()
}

/// Join `prefix` and `relative` into an object key.
///
/// Backslashes become `/` and the result never starts with `/`, so an empty
/// prefix yields just the relative path.
///
/// # Examples
/// ```
/// use postflow::io::cloud::helpers::object_key;
///
/// assert_eq!(object_key("exports/daily", "posts.parquet"), "exports/daily/posts.parquet");
/// assert_eq!(object_key("", "userId=1/part-00000.parquet"), "userId=1/part-00000.parquet");
/// ```
#[must_use]
pub fn object_key(prefix: &str, relative: &str) -> String {
    format!("{prefix}/{relative}")
        .replace('\\', "/")
        .trim_start_matches('/')
        .to_string()
}

/// Validate a bucket name
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty
/// - The name exceeds 255 characters
/// - The name contains invalid characters (only alphanumeric, hyphens, underscores, and periods are allowed)
pub fn validate_bucket_name(name: &str) -> CloudResult<()> {
    if name.is_empty() {
        return Err(CloudIOError::new(
            ErrorKind::InvalidInput,
            "Bucket name cannot be empty",
        ));
    }

    if name.len() > 255 {
        return Err(CloudIOError::new(
            ErrorKind::InvalidInput,
            "Bucket name too long (max 255 characters)",
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(CloudIOError::new(
            ErrorKind::InvalidInput,
            format!("Bucket name '{name}' contains invalid characters"),
        ));
    }

    Ok(())
}

/// Validate an object key
///
/// # Errors
///
/// Returns an error if:
/// - The key is empty
/// - The key starts with a forward slash
pub fn validate_key_path(path: &str) -> CloudResult<()> {
    if path.is_empty() {
        return Err(CloudIOError::new(
            ErrorKind::InvalidInput,
            "Key path cannot be empty",
        ));
    }

    if path.starts_with('/') {
        return Err(CloudIOError::new(
            ErrorKind::InvalidInput,
            "Key path cannot start with '/'",
        ));
    }

    Ok(())
}

/// Upload the local file at `path` to `bucket` under `key`.
///
/// # Errors
///
/// Returns an error if the key is invalid, the file cannot be read, or the
/// store rejects the upload.
pub fn upload_file(store: &dyn ObjectIO, bucket: &str, key: &str, path: &Path) -> CloudResult<()> {
    validate_key_path(key)?;
    let data = std::fs::read(path).map_err(|e| {
        CloudIOError::new(ErrorKind::InvalidInput, format!("read {}", path.display()))
            .with_source(e.to_string())
    })?;
    store.put_object(bucket, key, &data)
}
