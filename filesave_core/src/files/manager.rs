use axum::extract::Multipart;
use std::sync::Arc;

use crate::config::FileSaveConfig;
use crate::error::{AppError, Result};
use super::form::{read_form_entries, DEFAULT_SPOOL_THRESHOLD};
use super::models::{FormEntry, SubmittedFile};
use super::options::{resolve_options, UploadConstraint, UploadOptions};
use super::storage::{FileStorage, SaveError};
use super::validation::{FileValidator, UploadError};

/// Entry point for upload handlers: configured defaults, validation and storage.
///
/// The configured options are resolved once at startup and only read afterwards.
#[derive(Clone)]
pub struct FileManager {
    defaults: Arc<UploadOptions>,
    storage: FileStorage,
    spool_threshold: usize,
}

impl FileManager {
    pub fn new(config: &FileSaveConfig) -> Self {
        Self {
            defaults: Arc::new(config.options.clone()),
            storage: FileStorage::new(config.mount_root()),
            spool_threshold: config.spool_threshold_bytes,
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(&FileSaveConfig::default())
    }

    pub fn with_storage(mut self, storage: FileStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn defaults(&self) -> &UploadOptions {
        &self.defaults
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    pub fn spool_threshold(&self) -> usize {
        self.spool_threshold
    }

    /// Call-site options over configured defaults over built-in defaults.
    pub fn resolve(&self, call_site: &UploadOptions) -> UploadConstraint {
        resolve_options([call_site, self.defaults.as_ref()])
    }

    pub fn verify(
        &self,
        entries: Vec<FormEntry>,
        call_site: &UploadOptions,
    ) -> std::result::Result<Vec<SubmittedFile>, UploadError> {
        FileValidator::new(self.resolve(call_site)).verify(entries)
    }

    /// Reads the form key's entries from `multipart` and validates them.
    ///
    /// Rejections come back as [`AppError::Upload`] carrying the numeric code and
    /// a message in the resolved `lang`.
    pub async fn receive_files(
        &self,
        multipart: &mut Multipart,
        call_site: &UploadOptions,
    ) -> Result<Vec<SubmittedFile>> {
        let constraint = self.resolve(call_site);
        let entries = read_form_entries(multipart, &constraint.form_key, self.spool_threshold).await?;
        let lang = constraint.lang.clone();

        FileValidator::new(constraint).verify(entries).map_err(|err| {
            tracing::info!(code = err.code(), error = %err, "upload rejected");
            AppError::upload(&err, &lang)
        })
    }

    pub async fn save(
        &self,
        file: &SubmittedFile,
        target_name: Option<&str>,
        target_dir: Option<&str>,
    ) -> std::result::Result<String, SaveError> {
        self.storage.save(file, target_name, target_dir).await
    }
}

impl Default for FileManager {
    fn default() -> Self {
        Self {
            defaults: Arc::new(UploadOptions::default()),
            storage: FileStorage::default(),
            spool_threshold: DEFAULT_SPOOL_THRESHOLD,
        }
    }
}
