use thiserror::Error;

use super::models::{FormEntry, SubmittedFile};
use super::options::{EnsureOptions, Multiple, UploadConstraint};
use super::size::size_to_bytes;
use crate::i18n::{self, MessageParams, Translate};

/// Why a submission was rejected. Each kind maps to a stable numeric code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Received invalid file")]
    InvalidFile,

    #[error("Invalid file type. Only allowed: {}", .types.join(", "))]
    InvalidFileType { types: Vec<String> },

    #[error("File too heavy. Max size is: {max_size}")]
    FileTooLarge { max_size: String },

    #[error("No files received")]
    NoFilesReceived,

    #[error("Multiple files are not allowed")]
    MultipleFilesNotAllowed,

    #[error("Number of files exceeded, Maximum allowed: {multiple}")]
    TooManyFiles { multiple: u32 },

    #[error("Invalid file size format: {size}")]
    MalformedSizeExpression { size: String },

    #[error("Invalid file size unit: {unit}")]
    UnknownSizeUnit { unit: String },
}

impl UploadError {
    pub fn code(&self) -> u16 {
        match self {
            UploadError::InvalidFile => 1000,
            UploadError::InvalidFileType { .. } => 1001,
            UploadError::FileTooLarge { .. } => 1002,
            UploadError::NoFilesReceived => 1003,
            UploadError::MultipleFilesNotAllowed => 1004,
            UploadError::TooManyFiles { .. } => 1005,
            UploadError::MalformedSizeExpression { .. } => 1006,
            UploadError::UnknownSizeUnit { .. } => 1007,
        }
    }

    /// Interpolation params, keyed by the placeholders of the message tables.
    pub fn params(&self) -> MessageParams {
        let mut params = MessageParams::new();
        match self {
            UploadError::InvalidFileType { types } => {
                params.insert("types", types.join(", "));
            }
            UploadError::FileTooLarge { max_size } => {
                params.insert("maxSize", max_size.clone());
            }
            UploadError::TooManyFiles { multiple } => {
                params.insert("multiple", multiple.to_string());
            }
            UploadError::MalformedSizeExpression { size } => {
                params.insert("blobSize", size.clone());
            }
            UploadError::UnknownSizeUnit { unit } => {
                params.insert("sizeUnit", unit.clone());
            }
            UploadError::InvalidFile
            | UploadError::NoFilesReceived
            | UploadError::MultipleFilesNotAllowed => {}
        }
        params
    }

    pub fn localized(&self, lang: &str) -> String {
        i18n::render(lang, self.code(), &self.params())
    }

    pub fn message_with(&self, translator: &dyn Translate) -> String {
        translator.translate(self.code(), &self.params())
    }
}

/// Checks one entry against the per-file requirements.
pub fn ensure(entry: &FormEntry, options: &EnsureOptions) -> Result<(), UploadError> {
    let file = entry.as_file().ok_or(UploadError::InvalidFile)?;

    if let Some(max_size) = options.size_limit() {
        if file.size() > size_to_bytes(max_size)? {
            return Err(UploadError::FileTooLarge {
                max_size: max_size.to_string(),
            });
        }
    }

    let allowed = options.allowed_types();
    let matches_any = |token: &str| allowed.iter().any(|candidate| candidate.as_str() == token);
    if !allowed.is_empty() && !type_tokens(file).into_iter().any(matches_any) {
        return Err(UploadError::InvalidFileType {
            types: allowed.to_vec(),
        });
    }

    Ok(())
}

/// Declared content type as sent, its `type/subtype` essence, top-level type,
/// subtype and extension, compared case-sensitively.
fn type_tokens(file: &SubmittedFile) -> [&str; 5] {
    let declared = file.content_type();
    let essence = declared.split(';').next().unwrap_or_default().trim();
    let (top_level, subtype) = essence.split_once('/').unwrap_or((essence, ""));

    [declared, essence, top_level, subtype, file.extension()]
}

/// Applies an [`UploadConstraint`] to a whole submission.
#[derive(Debug, Clone)]
pub struct FileValidator {
    constraint: UploadConstraint,
}

impl FileValidator {
    pub fn new(constraint: UploadConstraint) -> Self {
        Self { constraint }
    }

    pub fn with_default_config() -> Self {
        Self::new(UploadConstraint::default())
    }

    pub fn constraint(&self) -> &UploadConstraint {
        &self.constraint
    }

    /// Accepts the whole submission or rejects it on the first violation.
    ///
    /// Count checks run before any per-file check; accepted files keep their
    /// submission order.
    pub fn verify(&self, entries: Vec<FormEntry>) -> Result<Vec<SubmittedFile>, UploadError> {
        let count = entries.len();

        if count == 0 {
            return Err(UploadError::NoFilesReceived);
        }

        match self.constraint.multiple {
            Multiple::Single if count > 1 => return Err(UploadError::MultipleFilesNotAllowed),
            Multiple::AtMost(limit) if count > limit as usize => {
                return Err(UploadError::TooManyFiles { multiple: limit })
            }
            _ => {}
        }

        let ensure_options = &self.constraint.ensure;
        if !ensure_options.is_empty() {
            for entry in &entries {
                ensure(entry, ensure_options)?;
            }
        }

        let files = entries
            .into_iter()
            .map(|entry| entry.into_file().ok_or(UploadError::InvalidFile))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            count = files.len(),
            form_key = %self.constraint.form_key,
            "upload submission accepted"
        );

        Ok(files)
    }
}
