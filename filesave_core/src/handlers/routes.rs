//! Route table for the upload API

use axum::{
    routing::{get, post},
    Router,
};

use super::{files, health};
use crate::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::handle_health))
        .route("/api/upload", post(files::upload_file))
        .route("/api/upload/batch", post(files::upload_files))
}
