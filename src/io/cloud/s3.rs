//! Amazon S3 implementation of [`ObjectIO`] on top of `object_store`.
//!
//! Credentials come from the standard AWS environment (`AWS_ACCESS_KEY_ID`,
//! `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN`, `AWS_ENDPOINT`, ...). Each
//! call is driven to completion on a private current-thread runtime, so the
//! type exposes the same blocking interface as every other [`ObjectIO`].

use crate::io::cloud::traits::{CloudIOError, CloudResult, ErrorKind, ObjectIO, ObjectMetadata};
use futures::TryStreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use std::collections::HashMap;
use tokio::runtime::Runtime;

/// S3 client bound to one bucket.
pub struct S3ObjectIO {
    bucket: String,
    store: AmazonS3,
    runtime: Runtime,
}

impl S3ObjectIO {
    /// Build a client for `bucket`, optionally pinning the region.
    ///
    /// # Errors
    ///
    /// Returns an error if the client or the runtime cannot be built.
    pub fn new(bucket: &str, region: Option<&str>) -> CloudResult<Self> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(region) = region {
            builder = builder.with_region(region);
        }
        let store = builder.build().map_err(store_error)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                CloudIOError::new(ErrorKind::InternalError, "start async runtime")
                    .with_source(e.to_string())
            })?;
        Ok(Self {
            bucket: bucket.to_string(),
            store,
            runtime,
        })
    }

    fn check_bucket(&self, bucket: &str) -> CloudResult<()> {
        if bucket == self.bucket {
            Ok(())
        } else {
            Err(CloudIOError::new(
                ErrorKind::InvalidInput,
                format!("client is bound to bucket {}, not {bucket}", self.bucket),
            ))
        }
    }
}

impl ObjectIO for S3ObjectIO {
    fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> CloudResult<()> {
        self.check_bucket(bucket)?;
        let path = StorePath::from(key);
        self.runtime
            .block_on(self.store.put(&path, PutPayload::from(data.to_vec())))
            .map(|_| ())
            .map_err(store_error)
    }

    fn get_object(&self, bucket: &str, key: &str) -> CloudResult<Vec<u8>> {
        self.check_bucket(bucket)?;
        let path = StorePath::from(key);
        let bytes = self
            .runtime
            .block_on(async { self.store.get(&path).await?.bytes().await })
            .map_err(store_error)?;
        Ok(bytes.to_vec())
    }

    fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> CloudResult<Vec<ObjectMetadata>> {
        self.check_bucket(bucket)?;
        let prefix = prefix.map(StorePath::from);
        let metas: Vec<object_store::ObjectMeta> = self
            .runtime
            .block_on(self.store.list(prefix.as_ref()).try_collect())
            .map_err(store_error)?;

        let mut objects: Vec<ObjectMetadata> = metas
            .into_iter()
            .map(|m| ObjectMetadata {
                key: m.location.to_string(),
                size: u64::try_from(m.size).unwrap_or(u64::MAX),
                last_modified: Some(m.last_modified.timestamp()),
                etag: m.e_tag,
                custom_metadata: HashMap::new(),
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn object_exists(&self, bucket: &str, key: &str) -> CloudResult<bool> {
        self.check_bucket(bucket)?;
        let path = StorePath::from(key);
        match self.runtime.block_on(self.store.head(&path)) {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(store_error(e)),
        }
    }
}

fn store_error(e: object_store::Error) -> CloudIOError {
    let kind = match &e {
        object_store::Error::NotFound { .. } => ErrorKind::NotFound,
        object_store::Error::PermissionDenied { .. } => ErrorKind::Authorization,
        object_store::Error::Unauthenticated { .. } => ErrorKind::Authentication,
        object_store::Error::Generic { .. } => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::Other,
    };
    CloudIOError::new(kind, "object store request failed").with_source(e.to_string())
}
