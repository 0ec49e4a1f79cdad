//! Persists accepted uploads below a mount root.
//!
//! Layout on disk is `<mount>/<target_dir>/<file name>`; the path handed back to
//! callers leaves the mount root out, since that root is what the static file
//! server exposes.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;

use super::models::SubmittedFile;

pub const DEFAULT_MOUNT: &str = "public";

/// Why a save did not complete. Returned by value; never escalated by the storage.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("No file name could be resolved for the upload")]
    EmptyFileName,

    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to read upload content: {0}")]
    ReadSource(#[source] io::Error),

    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    mount: PathBuf,
}

impl FileStorage {
    pub fn new(mount: impl Into<PathBuf>) -> Self {
        Self {
            mount: mount.into(),
        }
    }

    pub fn mount(&self) -> &Path {
        &self.mount
    }

    /// Streams `file` to `<mount>/<target_dir>/<name>` and returns `target_dir/name`.
    ///
    /// `target_name` defaults to the file's own name and gains the file's extension
    /// when it lacks it. An existing file at the destination is overwritten.
    /// Failures are logged and returned as [`SaveError`].
    pub async fn save(
        &self,
        file: &SubmittedFile,
        target_name: Option<&str>,
        target_dir: Option<&str>,
    ) -> Result<String, SaveError> {
        match self.try_save(file, target_name, target_dir).await {
            Ok(url) => {
                tracing::info!(url = %url, size = file.size(), "stored uploaded file");
                Ok(url)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    file = %file.name(),
                    mount = %self.mount.display(),
                    "Error uploading file"
                );
                Err(err)
            }
        }
    }

    async fn try_save(
        &self,
        file: &SubmittedFile,
        target_name: Option<&str>,
        target_dir: Option<&str>,
    ) -> Result<String, SaveError> {
        let file_name = resolve_file_name(file.name(), target_name)?;
        let dir_segments = path_segments(target_dir.unwrap_or_default())?;

        let directory = dir_segments
            .iter()
            .fold(self.mount.clone(), |path, segment| path.join(segment));
        async_fs::create_dir_all(&directory)
            .await
            .map_err(|source| SaveError::CreateDir {
                path: directory.clone(),
                source,
            })?;

        let destination = directory.join(&file_name);
        let write_err = |source| SaveError::Write {
            path: destination.clone(),
            source,
        };

        let mut reader = file.reader().await.map_err(SaveError::ReadSource)?;
        let mut output = async_fs::File::create(&destination).await.map_err(write_err)?;
        tokio::io::copy(&mut reader, &mut output).await.map_err(write_err)?;
        output.flush().await.map_err(write_err)?;
        output.sync_all().await.map_err(write_err)?;

        let mut url_segments = dir_segments;
        url_segments.push(&file_name);
        Ok(url_segments.join("/"))
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new(DEFAULT_MOUNT)
    }
}

/// Extension of `name` including the dot, as `path.extname` reports it:
/// `"a.tar.gz"` gives `".gz"`, dotfiles and bare names give `""`.
pub fn natural_extension(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(0) | None => "",
        Some(index) => &base[index..],
    }
}

fn resolve_file_name(own_name: &str, target_name: Option<&str>) -> Result<String, SaveError> {
    let extension = natural_extension(own_name);
    let target = target_name.unwrap_or(own_name);

    let file_name = if !target.is_empty() && target.ends_with(extension) {
        target.to_string()
    } else if !target.is_empty() {
        format!("{}{}", target, extension)
    } else {
        own_name.to_string()
    };

    if file_name.is_empty() {
        return Err(SaveError::EmptyFileName);
    }
    if file_name.contains(['/', '\\']) || file_name == "." || file_name == ".." {
        return Err(SaveError::InvalidPath(file_name));
    }

    Ok(file_name)
}

/// Splits a caller-supplied directory into URL segments. Empty and `.` segments
/// collapse; `..` is refused.
fn path_segments(dir: &str) -> Result<Vec<&str>, SaveError> {
    let mut segments = Vec::new();
    for segment in dir.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(SaveError::InvalidPath(dir.to_string())),
            segment => segments.push(segment),
        }
    }
    Ok(segments)
}
