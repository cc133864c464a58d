//! Storage gateway over an S3-compatible object store.
//!
//! Every operation follows the same path: configuration gate, argument
//! validation, exactly one backend call, then translation of the backend
//! failure into a [`StorageError`]. Validation failures never reach the
//! backend and are never wrapped as backend errors.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Settings;

pub mod memory;
pub mod s3_client;
pub mod validation;

pub use memory::InMemoryObjectStore;
pub use s3_client::S3ObjectStore;

/// Status code a backend reports for an absent object.
pub const NOT_FOUND_CODE: &str = "404";

/// Failure reported by an [`ObjectStore`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    pub code: Option<String>,
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code.as_deref() == Some(NOT_FOUND_CODE)
    }
}

/// An object as reported by the list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub name: String,
    pub size: u64,
    pub last_modified: String,
}

/// The four backend calls the gateway relies on, scoped to one bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), BackendError>;

    async fn list_objects(&self) -> Result<Vec<StoredObject>, BackendError>;

    async fn head_object(&self, key: &str) -> Result<(), BackendError>;

    async fn presign_get(&self, key: &str, expires_in_secs: u64) -> Result<String, BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{message}")]
    Upload {
        message: String,
        code: Option<String>,
    },

    #[error("{message}")]
    List {
        message: String,
        code: Option<String>,
    },

    #[error("{message}")]
    PresignedUrl {
        message: String,
        code: Option<String>,
    },

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    FileValidation(String),
}

impl StorageError {
    /// Backend error code carried by the failure, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            StorageError::Upload { code, .. }
            | StorageError::List { code, .. }
            | StorageError::PresignedUrl { code, .. } => code.as_deref(),
            StorageError::Configuration(_) | StorageError::FileValidation(_) => None,
        }
    }

    fn upload(context: &str, err: BackendError) -> Self {
        StorageError::Upload {
            message: format!("{}: {}", context, err.message),
            code: err.code,
        }
    }

    fn list(context: &str, err: BackendError) -> Self {
        StorageError::List {
            message: format!("{}: {}", context, err.message),
            code: err.code,
        }
    }

    fn presigned_url(context: &str, err: BackendError) -> Self {
        StorageError::PresignedUrl {
            message: format!("{}: {}", context, err.message),
            code: err.code,
        }
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Clone)]
pub struct StorageGateway {
    settings: Arc<Settings>,
    store: Arc<dyn ObjectStore>,
}

impl StorageGateway {
    pub fn new(settings: Arc<Settings>, store: Arc<dyn ObjectStore>) -> Self {
        Self { settings, store }
    }

    fn ensure_configured(&self) -> StorageResult<()> {
        if self.settings.is_valid() {
            return Ok(());
        }
        let missing = self.settings.missing_fields().join(", ");
        warn!("Storage call rejected, missing configuration: {}", missing);
        Err(StorageError::Configuration(format!(
            "Missing required configuration: {}",
            missing
        )))
    }

    /// Upload `content` under `key` after checking name, extension and size.
    pub async fn put(&self, content: Bytes, key: &str) -> StorageResult<()> {
        self.ensure_configured()?;
        validation::validate_upload(key, content.len() as u64, &self.settings)?;

        let content_type = mime_guess::from_path(key).first_or_octet_stream();
        let size = content.len();
        self.store
            .put_object(key, content, content_type.essence_str())
            .await
            .map_err(|e| StorageError::upload("Failed to upload file", e))?;

        info!("Uploaded {} ({} bytes) to bucket {}", key, size, self.settings.aws_s3_bucket);
        Ok(())
    }

    /// List every object in the configured bucket. An empty bucket is not an error.
    pub async fn list(&self) -> StorageResult<Vec<StoredObject>> {
        self.ensure_configured()?;

        let objects = self
            .store
            .list_objects()
            .await
            .map_err(|e| StorageError::list("Failed to list files", e))?;

        debug!("Listed {} objects", objects.len());
        Ok(objects
            .into_iter()
            .map(|object| StoredObject {
                last_modified: normalize_timestamp(object.last_modified),
                ..object
            })
            .collect())
    }

    /// Produce a time-limited download URL for `key`.
    ///
    /// Falls back to the configured default expiration when `expires_in_secs`
    /// is `None`.
    pub async fn sign(&self, key: &str, expires_in_secs: Option<u64>) -> StorageResult<String> {
        self.ensure_configured()?;
        if key.is_empty() {
            return Err(StorageError::FileValidation("File name is required".to_string()));
        }

        let expiration = expires_in_secs.unwrap_or(self.settings.presigned_url_expiration);
        self.store
            .presign_get(key, expiration)
            .await
            .map_err(|e| StorageError::presigned_url("Failed to generate presigned URL", e))
    }

    /// Probe whether `key` exists. A not-found response yields `false`.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.ensure_configured()?;

        match self.store.head_object(key).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(StorageError::presigned_url(
                "Error checking file existence",
                e,
            )),
        }
    }
}

fn normalize_timestamp(raw: String) -> String {
    match chrono::DateTime::parse_from_rfc3339(&raw) {
        Ok(parsed) => parsed.with_timezone(&chrono::Utc).to_rfc3339(),
        Err(_) => raw,
    }
}
