use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::warn;

use crate::models::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

/// GET /health - configuration check plus a live listing probe
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings.is_valid() {
        let reason = format!(
            "Missing required configuration: {}",
            state.settings.missing_fields().join(", ")
        );
        warn!("Health check failed: {}", reason);
        return unhealthy(reason);
    }

    match state.storage.list().await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                message: "API is healthy and S3 is accessible".to_string(),
                detail: None,
            }),
        ),
        Err(e) => {
            warn!("Health probe failed: {}", e);
            unhealthy(format!("S3 connection failed: {}", e))
        }
    }
}

fn unhealthy(reason: String) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse {
            status: "unhealthy".to_string(),
            message: reason.clone(),
            detail: Some(reason),
        }),
    )
}
