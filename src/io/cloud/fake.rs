//! In-memory object store for tests.
//!
//! [`FakeObjectIO`] keeps every bucket in a shared map, so clones observe the
//! same contents. [`FakeObjectIO::failing`] builds a store whose uploads
//! always fail, for exercising error propagation.

use crate::io::cloud::traits::{CloudIOError, CloudResult, ErrorKind, ObjectIO, ObjectMetadata};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type BucketStorage = Arc<Mutex<HashMap<String, HashMap<String, Vec<u8>>>>>;

#[derive(Clone)]
pub struct FakeObjectIO {
    storage: BucketStorage,
    put_failure: Option<ErrorKind>,
}

impl FakeObjectIO {
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(Mutex::new(HashMap::new())),
            put_failure: None,
        }
    }

    /// A store that rejects every upload with `kind`.
    #[must_use]
    pub fn failing(kind: ErrorKind) -> Self {
        Self {
            put_failure: Some(kind),
            ..Self::new()
        }
    }

    /// All keys in `bucket`, sorted.
    #[must_use]
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let storage = self.storage.lock().expect("storage mutex poisoned");
        let mut keys: Vec<String> = storage
            .get(bucket)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default();
        drop(storage);
        keys.sort();
        keys
    }
}

impl Default for FakeObjectIO {
    fn default() -> Self {
        Self::new()
    }
}

fn metadata(key: &str, data: &[u8]) -> ObjectMetadata {
    ObjectMetadata {
        key: key.to_string(),
        size: data.len() as u64,
        last_modified: Some(0),
        etag: Some(format!("etag-{key}")),
        custom_metadata: HashMap::new(),
    }
}

impl ObjectIO for FakeObjectIO {
    fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> CloudResult<()> {
        if let Some(kind) = &self.put_failure {
            return Err(CloudIOError::new(
                kind.clone(),
                format!("upload of {bucket}/{key} rejected"),
            ));
        }
        self.storage
            .lock()
            .expect("storage mutex poisoned")
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn get_object(&self, bucket: &str, key: &str) -> CloudResult<Vec<u8>> {
        let storage = self.storage.lock().expect("storage mutex poisoned");
        storage
            .get(bucket)
            .and_then(|b| b.get(key))
            .cloned()
            .ok_or_else(|| {
                CloudIOError::new(
                    ErrorKind::NotFound,
                    format!("Object {bucket}/{key} not found"),
                )
            })
    }

    fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> CloudResult<Vec<ObjectMetadata>> {
        let storage = self.storage.lock().expect("storage mutex poisoned");
        let bucket_map = storage.get(bucket).ok_or_else(|| {
            CloudIOError::new(ErrorKind::NotFound, format!("Bucket {bucket} not found"))
        })?;

        let mut objects: Vec<ObjectMetadata> = bucket_map
            .iter()
            .filter(|(key, _)| prefix.is_none_or(|p| key.starts_with(p)))
            .map(|(key, data)| metadata(key, data))
            .collect();

        drop(storage);
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn object_exists(&self, bucket: &str, key: &str) -> CloudResult<bool> {
        let storage = self.storage.lock().expect("storage mutex poisoned");
        Ok(storage.get(bucket).is_some_and(|b| b.contains_key(key)))
    }
}
