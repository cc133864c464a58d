//! In-memory [`ObjectStore`] for tests and local development.
//!
//! Counts every backend call it receives so callers can assert that
//! rejected requests never reached storage.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{BackendError, ObjectStore, StoredObject, NOT_FOUND_CODE};

struct Entry {
    content: Bytes,
    content_type: String,
    last_modified: String,
}

pub struct InMemoryObjectStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, Entry>>,
    next_failure: Mutex<Option<BackendError>>,
    calls: AtomicUsize,
}

impl InMemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
            next_failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of backend calls received so far.
    pub fn backend_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next backend call fail with `err`.
    pub fn fail_next(&self, err: BackendError) {
        *lock(&self.next_failure) = Some(err);
    }

    pub fn insert(&self, key: &str, content: Bytes) {
        self.insert_with_timestamp(key, content, &chrono::Utc::now().to_rfc3339());
    }

    pub fn insert_with_timestamp(&self, key: &str, content: Bytes, last_modified: &str) {
        let content_type = mime_guess::from_path(key)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        lock(&self.objects).insert(
            key.to_string(),
            Entry {
                content,
                content_type,
                last_modified: last_modified.to_string(),
            },
        );
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        lock(&self.objects).get(key).map(|e| e.content.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        lock(&self.objects).get(key).map(|e| e.content_type.clone())
    }

    fn begin_call(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.next_failure).take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// A poisoned lock only means another test thread panicked; the map is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), BackendError> {
        self.begin_call()?;
        lock(&self.objects).insert(
            key.to_string(),
            Entry {
                content,
                content_type: content_type.to_string(),
                last_modified: chrono::Utc::now().to_rfc3339(),
            },
        );
        Ok(())
    }

    async fn list_objects(&self) -> Result<Vec<StoredObject>, BackendError> {
        self.begin_call()?;
        Ok(lock(&self.objects)
            .iter()
            .map(|(key, entry)| StoredObject {
                name: key.clone(),
                size: entry.content.len() as u64,
                last_modified: entry.last_modified.clone(),
            })
            .collect())
    }

    async fn head_object(&self, key: &str) -> Result<(), BackendError> {
        self.begin_call()?;
        if lock(&self.objects).contains_key(key) {
            Ok(())
        } else {
            Err(BackendError::with_code(NOT_FOUND_CODE, "Not Found"))
        }
    }

    async fn presign_get(&self, key: &str, expires_in_secs: u64) -> Result<String, BackendError> {
        self.begin_call()?;
        Ok(format!(
            "memory://{}/{}?expires={}",
            self.bucket, key, expires_in_secs
        ))
    }
}
