use axum::{extract::State, routing::get, Json, Router};

use crate::config::{API_TITLE, API_VERSION};
use crate::models::{AppState, RootResponse};

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}

/// GET / - service banner with the upload policy
async fn index(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} is running!", API_TITLE),
        version: API_VERSION.to_string(),
        max_file_size_mb: state.settings.max_file_size_mb(),
        allowed_extensions: state.settings.allowed_extensions.clone(),
    })
}
