// S3 client backed by the rust-s3 crate

use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;
use std::sync::Arc;
use tracing::debug;

use super::{BackendError, ObjectStore, StoredObject, NOT_FOUND_CODE};
use crate::config::Settings;

pub struct S3ObjectStore {
    settings: Arc<Settings>,
}

impl S3ObjectStore {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    // Built per call; construction is local and performs no network I/O.
    fn bucket(&self) -> Result<Bucket, BackendError> {
        let region = match &self.settings.s3_endpoint {
            Some(endpoint) => Region::Custom {
                region: self.settings.aws_region.clone(),
                endpoint: endpoint.clone(),
            },
            None => self
                .settings
                .aws_region
                .parse()
                .map_err(|e| BackendError::new(format!("Invalid region: {}", e)))?,
        };

        let credentials = Credentials::new(
            Some(self.settings.aws_access_key_id.as_str()),
            Some(self.settings.aws_secret_access_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| BackendError::new(format!("Invalid credentials: {}", e)))?;

        let bucket = Bucket::new(&self.settings.aws_s3_bucket, region, credentials)
            .map_err(backend_error)?;

        if self.settings.s3_endpoint.is_some() {
            Ok(bucket.with_path_style())
        } else {
            Ok(bucket)
        }
    }
}

fn backend_error(err: S3Error) -> BackendError {
    match err {
        S3Error::HttpFailWithBody(status, body) => BackendError::with_code(
            status.to_string(),
            format!("S3 responded with HTTP {}: {}", status, body),
        ),
        other => BackendError::new(other.to_string()),
    }
}

fn status_error(status: u16) -> BackendError {
    BackendError::with_code(
        status.to_string(),
        format!("S3 responded with HTTP {}", status),
    )
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let bucket = self.bucket()?;
        let response = bucket
            .put_object_with_content_type(key, &content, content_type)
            .await
            .map_err(backend_error)?;

        match response.status_code() {
            200..=299 => Ok(()),
            status => Err(status_error(status)),
        }
    }

    async fn list_objects(&self) -> Result<Vec<StoredObject>, BackendError> {
        let bucket = self.bucket()?;
        let pages = bucket
            .list(String::new(), None)
            .await
            .map_err(backend_error)?;

        let objects: Vec<StoredObject> = pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| StoredObject {
                name: object.key,
                size: object.size,
                last_modified: object.last_modified,
            })
            .collect();

        debug!("S3 list returned {} objects", objects.len());
        Ok(objects)
    }

    async fn head_object(&self, key: &str) -> Result<(), BackendError> {
        let bucket = self.bucket()?;
        let (_, status) = bucket.head_object(key).await.map_err(backend_error)?;

        match status {
            200..=299 => Ok(()),
            404 => Err(BackendError::with_code(NOT_FOUND_CODE, "Not Found")),
            status => Err(status_error(status)),
        }
    }

    async fn presign_get(&self, key: &str, expires_in_secs: u64) -> Result<String, BackendError> {
        let expiry = u32::try_from(expires_in_secs).map_err(|_| {
            BackendError::new(format!(
                "Expiration of {} seconds is out of range",
                expires_in_secs
            ))
        })?;

        let bucket = self.bucket()?;
        bucket
            .presign_get(key, expiry, None)
            .await
            .map_err(backend_error)
    }
}
