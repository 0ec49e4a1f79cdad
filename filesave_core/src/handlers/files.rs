use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    files::{FileManager, SaveError, SubmittedFile, UploadOptions},
    AppState,
};

const SINGLE_UPLOAD_TYPES: [&str; 8] = ["audio", "csv", "image", "video", "pdf", "text", "zip", "exe"];
const BATCH_UPLOAD_TYPES: [&str; 6] = ["audio", "csv", "image", "video", "pdf", "text"];
const BATCH_UPLOAD_LIMIT: u32 = 3;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UploadQuery {
    #[validate(length(min = 2, max = 16, message = "lang must be a locale tag"))]
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse<T> {
    pub code: u16,
    pub msg: String,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedUpload>,
}

impl<T> UploadResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            msg: "success".to_string(),
            data,
            failed: Vec::new(),
        }
    }

    pub fn with_failures(mut self, failed: Vec<FailedUpload>) -> Self {
        if !failed.is_empty() {
            self.msg = "partial success".to_string();
        }
        self.failed = failed;
        self
    }
}

/// A file from a batch that was accepted but could not be stored.
#[derive(Debug, Serialize)]
pub struct FailedUpload {
    pub name: String,
    pub reason: String,
}

pub fn single_upload_options() -> UploadOptions {
    UploadOptions::new()
        .multiple(false)
        .max_size("256MB")
        .types(SINGLE_UPLOAD_TYPES)
}

pub fn batch_upload_options() -> UploadOptions {
    UploadOptions::new()
        .multiple(BATCH_UPLOAD_LIMIT)
        .max_size("50MB")
        .types(BATCH_UPLOAD_TYPES)
}

/// `upload/YYYY/MM/DD` for the given instant.
pub fn dated_directory<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("upload/%Y/%m/%d").to_string()
}

/// `<millis>-<6 random characters>`; the extension is appended on save.
pub fn generated_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.timestamp_millis(), &suffix[..6])
}

fn call_site_options(base: UploadOptions, query: UploadQuery) -> Result<UploadOptions> {
    query
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid query parameters: {}", e)))?;

    Ok(match query.lang {
        Some(lang) => base.lang(lang),
        None => base,
    })
}

async fn store(manager: &FileManager, file: &SubmittedFile) -> std::result::Result<String, SaveError> {
    let now = Local::now();
    let name = generated_name(&now);
    let directory = dated_directory(&now);
    manager.save(file, Some(name.as_str()), Some(directory.as_str())).await
}

/// Accepts exactly one file under `files` and stores it in today's directory.
pub async fn upload_file(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse<String>>> {
    let options = call_site_options(single_upload_options(), query)?;
    let lang = state.file_manager.resolve(&options).lang;

    let files = state.file_manager.receive_files(&mut multipart, &options).await?;
    let file = files.first().ok_or(AppError::InternalServerError)?;

    let url = store(&state.file_manager, file)
        .await
        .map_err(|e| AppError::upload_failed(e, &lang))?;

    tracing::info!(url = %url, name = %file.name(), "file uploaded");
    Ok(Json(UploadResponse::success(url)))
}

/// Stores every file, collecting the stored paths and the files that failed.
async fn store_each(
    manager: &FileManager,
    files: &[SubmittedFile],
) -> (Vec<String>, Vec<(FailedUpload, SaveError)>) {
    let mut urls = Vec::with_capacity(files.len());
    let mut failed = Vec::new();

    for file in files {
        match store(manager, file).await {
            Ok(url) => urls.push(url),
            Err(err) => {
                let failure = FailedUpload {
                    name: file.name().to_string(),
                    reason: err.to_string(),
                };
                failed.push((failure, err));
            }
        }
    }

    (urls, failed)
}

/// Accepts up to three files. Files that fail to store are listed under
/// `failed`; the request fails only when none could be stored.
pub async fn upload_files(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse<Vec<String>>>> {
    let options = call_site_options(batch_upload_options(), query)?;
    let lang = state.file_manager.resolve(&options).lang;

    let files = state.file_manager.receive_files(&mut multipart, &options).await?;
    let (urls, mut failed) = store_each(&state.file_manager, &files).await;

    if urls.is_empty() {
        if let Some((_, err)) = failed.pop() {
            return Err(AppError::upload_failed(err, &lang));
        }
    }

    tracing::info!(stored = urls.len(), failed = failed.len(), "batch uploaded");
    let failed = failed.into_iter().map(|(failure, _)| failure).collect();
    Ok(Json(UploadResponse::success(urls).with_failures(failed)))
}
