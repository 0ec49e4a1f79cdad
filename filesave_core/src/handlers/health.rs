//! Liveness endpoint

use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
        "app": state.app_name,
        "version": state.version,
        "mount": state.file_manager.storage().mount().display().to_string(),
    }))
}
