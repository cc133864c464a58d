use std::sync::Arc;

use crate::config::Settings;
use crate::storage::{S3ObjectStore, StorageGateway, StoredObject};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub storage: StorageGateway,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, storage: StorageGateway) -> Self {
        Self { settings, storage }
    }

    /// State wired to the real S3 backend.
    pub fn with_s3(settings: Settings) -> Self {
        let settings = Arc::new(settings);
        let store = Arc::new(S3ObjectStore::new(settings.clone()));
        let storage = StorageGateway::new(settings.clone(), store);
        Self { settings, storage }
    }
}

// API Request/Response types

#[derive(Debug, serde::Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub max_file_size_mb: f64,
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_name: String,
    pub file_size: u64,
}

#[derive(Debug, serde::Serialize)]
pub struct FileListResponse {
    pub files: Vec<StoredObject>,
    pub total_files: usize,
}

#[derive(Debug, serde::Deserialize)]
pub struct DownloadParams {
    pub expires_in: Option<u64>,
}

#[derive(Debug, serde::Serialize)]
pub struct DownloadResponse {
    pub download_url: String,
    pub file_name: String,
    pub expires_in_seconds: u64,
}
