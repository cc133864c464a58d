//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/` - Service banner and upload policy
//! - `/health` - Configuration and storage health check
//! - `/upload`, `/files`, `/download/{file_name}` - File operations

pub mod files;
pub mod health;
pub mod index;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Allowance on top of the file size limit for multipart framing.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let body_limit = usize::try_from(state.settings.max_file_size.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);
    let origins = state.settings.server.cors_allowed_origins.clone();

    let router = Router::new()
        .merge(index::router(state.clone()))
        .merge(health::router(state.clone()))
        .merge(files::router(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &origins)
}
