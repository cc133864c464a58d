//! File endpoints
//!
//! - `POST /upload` - multipart upload (field `file`)
//! - `GET /files` - list the bucket
//! - `GET /download/{file_name}` - presigned download link

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::{error, info, warn};

use crate::config::MAX_PRESIGNED_URL_EXPIRATION;
use crate::models::{AppState, DownloadParams, DownloadResponse, FileListResponse, UploadResponse};
use crate::storage::{validation, StorageError};
use crate::types::{AppError, AppResult};

const FILE_FIELD: &str = "file";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload_file))
        .route("/files", get(list_files))
        .route("/download/", get(download_without_name))
        .route("/download/{*file_name}", get(download_file))
        .with_state(state)
}

async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    info!("File upload request received");
    let mut multipart = multipart?;

    let (file_name, content) = read_file_field(&mut multipart, &state).await?;
    let file_size = content.len() as u64;

    if !validation::is_within_size_limit(file_size, &state.settings) {
        warn!("Rejected {}: {} bytes over limit", file_name, file_size);
        return Err(AppError::InvalidRequest(
            validation::size_error(&state.settings).to_string(),
        ));
    }

    match state.storage.put(content, &file_name).await {
        Ok(()) => Ok(Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            file_name,
            file_size,
        })),
        Err(e @ (StorageError::FileValidation(_) | StorageError::Configuration(_))) => {
            warn!("Upload of {} rejected: {}", file_name, e);
            Err(AppError::InvalidRequest(e.to_string()))
        }
        Err(e @ StorageError::Upload { .. }) => {
            error!("Upload of {} failed: {}", file_name, e);
            Err(AppError::Internal(e.to_string()))
        }
        Err(e) => {
            error!("Unexpected error uploading {}: {}", file_name, e);
            Err(AppError::Internal(format!("Unexpected error: {}", e)))
        }
    }
}

async fn read_file_field(
    multipart: &mut Multipart,
    state: &AppState,
) -> AppResult<(String, Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, state))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::InvalidRequest("File name is required".to_string()))?;
        let content = field.bytes().await.map_err(|e| multipart_error(e, state))?;

        return Ok((file_name, content));
    }

    Err(AppError::InvalidRequest("No file provided".to_string()))
}

fn multipart_error(err: MultipartError, state: &AppState) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::InvalidRequest(validation::size_error(&state.settings).to_string());
    }
    AppError::InvalidRequest(format!("Invalid multipart request: {}", err.body_text()))
}

async fn list_files(State(state): State<AppState>) -> AppResult<Json<FileListResponse>> {
    match state.storage.list().await {
        Ok(files) => Ok(Json(FileListResponse {
            total_files: files.len(),
            files,
        })),
        Err(e @ (StorageError::Configuration(_) | StorageError::List { .. })) => {
            error!("Failed to list files: {}", e);
            Err(AppError::Internal(e.to_string()))
        }
        Err(e) => {
            error!("Unexpected error listing files: {}", e);
            Err(AppError::Internal(format!("Unexpected error: {}", e)))
        }
    }
}

async fn download_without_name() -> AppError {
    AppError::InvalidRequest("File name is required".to_string())
}

async fn download_file(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<DownloadParams>, QueryRejection>,
) -> AppResult<Json<DownloadResponse>> {
    let Path(file_name) = path?;
    let Query(params) = query?;
    if file_name.is_empty() {
        return Err(AppError::InvalidRequest("File name is required".to_string()));
    }

    let expires_in_seconds = match params.expires_in {
        Some(secs) if secs == 0 || secs > MAX_PRESIGNED_URL_EXPIRATION => {
            return Err(AppError::InvalidRequest(format!(
                "expires_in must be between 1 and {} seconds",
                MAX_PRESIGNED_URL_EXPIRATION
            )));
        }
        Some(secs) => secs,
        None => state.settings.presigned_url_expiration,
    };

    match state.storage.exists(&file_name).await {
        Ok(true) => {}
        Ok(false) => {
            info!("Download requested for missing file {}", file_name);
            return Err(AppError::NotFound(format!("File '{}' not found", file_name)));
        }
        Err(e) => return Err(download_error(&file_name, e)),
    }

    let download_url = state
        .storage
        .sign(&file_name, Some(expires_in_seconds))
        .await
        .map_err(|e| download_error(&file_name, e))?;

    info!("Issued download link for {} ({}s)", file_name, expires_in_seconds);
    Ok(Json(DownloadResponse {
        download_url,
        file_name,
        expires_in_seconds,
    }))
}

fn download_error(file_name: &str, err: StorageError) -> AppError {
    match err {
        StorageError::FileValidation(message) => AppError::InvalidRequest(message),
        e @ (StorageError::Configuration(_) | StorageError::PresignedUrl { .. }) => {
            error!("Download link for {} failed: {}", file_name, e);
            AppError::Internal(e.to_string())
        }
        e => {
            error!("Unexpected error preparing download of {}: {}", file_name, e);
            AppError::Internal(format!("Unexpected error: {}", e))
        }
    }
}
