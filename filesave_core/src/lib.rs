//! Upload validation and persistence, with the axum handlers that expose them.

pub mod config;
pub mod error;
pub mod files;
pub mod handlers;
pub mod i18n;
pub mod middleware;

pub use config::{AppConfig, FileSaveConfig, ServerConfig};
pub use error::{AppError, Result};
pub use files::{
    ensure, read_form_entries, resolve_options, size_to_bytes, EnsureOptions, FileManager,
    FileStorage, FileValidator, FormEntry, Multiple, SaveError, SubmittedFile, UploadConstraint,
    UploadError, UploadOptions,
};
pub use handlers::routes::create_routes;
pub use i18n::{MessageCatalog, Translate};

use axum::{extract::DefaultBodyLimit, Router};
use std::net::SocketAddr;
use tokio::signal;
use tower_http::services::ServeDir;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub file_manager: FileManager,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(FileManager::default())
    }
}

impl AppState {
    pub fn new(file_manager: FileManager) -> Self {
        Self {
            app_name: "filesave".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            file_manager,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(FileManager::new(&config.file_save))
    }

    pub fn with_file_manager(mut self, file_manager: FileManager) -> Self {
        self.file_manager = file_manager;
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    create_app_with_config(state, AppConfig::default())
}

/// API routes, with static files from the storage mount as the fallback.
pub fn create_app_with_config(state: AppState, config: AppConfig) -> Router {
    let static_files = ServeDir::new(state.file_manager.storage().mount());

    Router::new()
        .merge(create_routes())
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(middleware::logging::logging_layer())
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let app = app.into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
