//! Application error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::files::{SaveError, UploadError};
use crate::i18n::{self, MessageCatalog, MessageParams, Translate};

pub type Result<T> = std::result::Result<T, AppError>;

/// Reply sent for code 1000 in place of the table message.
pub const INVALID_FILE_REPLY: &str = "Please upload a valid file";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    InternalServerError,

    #[error("Upload rejected: {error}")]
    Upload { error: UploadError, lang: String },

    #[error("Upload failed: {source}")]
    UploadFailed {
        #[source]
        source: SaveError,
        lang: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn upload(error: &UploadError, lang: &str) -> Self {
        AppError::Upload {
            error: error.clone(),
            lang: lang.to_string(),
        }
    }

    pub fn upload_failed(source: SaveError, lang: &str) -> Self {
        AppError::UploadFailed {
            source,
            lang: lang.to_string(),
        }
    }

    /// Numeric code placed in the `code` field of the JSON reply.
    pub fn code(&self) -> u16 {
        match self {
            AppError::Upload { error, .. } => error.code(),
            AppError::UploadFailed { .. } => i18n::UPLOAD_FAILED,
            other => other.status().as_u16(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Upload { .. } | AppError::JsonError(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError
            | AppError::UploadFailed { .. }
            | AppError::IoError(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match self {
            AppError::BadRequest(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::InternalServerError => "Internal server error".to_string(),
            AppError::Upload { error, .. } if error == UploadError::InvalidFile => {
                INVALID_FILE_REPLY.to_string()
            }
            AppError::Upload { error, lang } => error.message_with(&MessageCatalog::new(&lang)),
            AppError::UploadFailed { source, lang } => {
                tracing::error!("Upload failed: {}", source);
                MessageCatalog::new(&lang).translate(i18n::UPLOAD_FAILED, &MessageParams::new())
            }
            AppError::IoError(err) => {
                tracing::error!("IO error: {:?}", err);
                "Internal server error".to_string()
            }
            AppError::JsonError(err) => {
                tracing::error!("JSON error: {:?}", err);
                "Invalid JSON data".to_string()
            }
            AppError::Other(err) => {
                tracing::error!("Unexpected error: {:?}", err);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "code": code,
            "msg": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn reply(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_upload_error_reply_is_localized() {
        let error = UploadError::TooManyFiles { multiple: 3 };

        let (status, body) = reply(AppError::upload(&error, "en")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 1005);
        assert_eq!(body["msg"], "Number of files exceeded, Maximum allowed: 3");

        let (_, body) = reply(AppError::upload(&error, "zh")).await;
        assert_eq!(body["msg"], "文件数量超出限制，最多允许：3");
    }

    #[tokio::test]
    async fn test_invalid_file_reply_is_generic() {
        let (status, body) = reply(AppError::upload(&UploadError::InvalidFile, "zh")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 1000);
        assert_eq!(body["msg"], INVALID_FILE_REPLY);
    }

    #[tokio::test]
    async fn test_save_failure_reply() {
        let error = AppError::upload_failed(SaveError::EmptyFileName, "en");

        let (status, body) = reply(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 1008);
        assert_eq!(body["msg"], "Error uploading file");

        let (_, body) = reply(AppError::upload_failed(SaveError::EmptyFileName, "zh-CN")).await;
        assert_eq!(body["msg"], "文件上传失败");
    }

    #[tokio::test]
    async fn test_bad_request_reply() {
        let (status, body) = reply(AppError::BadRequest("Failed to read multipart field".into())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
        assert_eq!(body["msg"], "Failed to read multipart field");
    }
}
