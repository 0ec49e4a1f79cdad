//! Reads the entries submitted under one form key from a multipart body.

use axum::extract::multipart::{Field, Multipart};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use super::models::{FormEntry, SubmittedFile};
use crate::error::{AppError, Result};

pub const DEFAULT_SPOOL_THRESHOLD: usize = 1024 * 1024;

/// Collects every field named `form_key`, in submission order.
///
/// Fields with a filename become files; their bodies stay in memory up to
/// `spool_threshold` bytes and are spooled to a temporary file beyond that.
pub async fn read_form_entries(
    multipart: &mut Multipart,
    form_key: &str,
    spool_threshold: usize,
) -> Result<Vec<FormEntry>> {
    let mut entries = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        if field.name() != Some(form_key) {
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_owned) else {
            let value = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read form field: {}", e))
            })?;
            entries.push(FormEntry::Text(value));
            continue;
        };

        let content_type = match field.content_type() {
            Some(declared) => declared.to_string(),
            None => mime_guess::from_path(&file_name)
                .first_or(mime::APPLICATION_OCTET_STREAM)
                .essence_str()
                .to_string(),
        };

        let file = read_file_field(&mut field, file_name, content_type, spool_threshold).await?;
        entries.push(FormEntry::File(file));
    }

    tracing::debug!(form_key, count = entries.len(), "read multipart entries");
    Ok(entries)
}

async fn read_file_field(
    field: &mut Field<'_>,
    file_name: String,
    content_type: String,
    spool_threshold: usize,
) -> Result<SubmittedFile> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut spool: Option<(NamedTempFile, tokio::fs::File)> = None;
    let mut size: u64 = 0;

    while let Some(chunk) = field.chunk().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read file data: {}", e))
    })? {
        size += chunk.len() as u64;

        if let Some((_, output)) = spool.as_mut() {
            output.write_all(&chunk).await?;
            continue;
        }

        if buffer.len() + chunk.len() <= spool_threshold {
            buffer.extend_from_slice(&chunk);
            continue;
        }

        let temp = NamedTempFile::new()?;
        let mut output = tokio::fs::File::from_std(temp.reopen()?);
        output.write_all(&buffer).await?;
        output.write_all(&chunk).await?;
        buffer = Vec::new();

        tracing::debug!(file = %file_name, path = %temp.path().display(), "spooling upload to disk");
        spool = Some((temp, output));
    }

    match spool {
        Some((temp, mut output)) => {
            output.flush().await?;
            Ok(SubmittedFile::spooled(file_name, content_type, size, temp))
        }
        None => Ok(SubmittedFile::from_bytes(file_name, content_type, buffer)),
    }
}
