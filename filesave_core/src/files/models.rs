use axum::body::Bytes;
use std::io::{self, Cursor};
use tempfile::NamedTempFile;
use tokio::io::AsyncRead;

/// Where the bytes of a submitted file live until they are saved.
#[derive(Debug)]
pub enum FileBody {
    Memory(Bytes),
    /// Spooled to disk while the multipart stream was read.
    Spooled(NamedTempFile),
}

/// A named, typed, sized file taken from a multipart form.
#[derive(Debug)]
pub struct SubmittedFile {
    name: String,
    content_type: String,
    size: u64,
    body: FileBody,
}

impl SubmittedFile {
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: data.len() as u64,
            body: FileBody::Memory(data),
        }
    }

    pub fn spooled(
        name: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
        file: NamedTempFile,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size,
            body: FileBody::Spooled(file),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn body(&self) -> &FileBody {
        &self.body
    }

    /// Text after the last `.` of the name, empty when there is none.
    pub fn extension(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default()
    }

    /// Opens a fresh reader over the content; may be called more than once.
    pub async fn reader(&self) -> io::Result<Box<dyn AsyncRead + Send + Unpin>> {
        match &self.body {
            FileBody::Memory(data) => Ok(Box::new(Cursor::new(data.clone()))),
            FileBody::Spooled(file) => {
                let file = tokio::fs::File::open(file.path()).await?;
                Ok(Box::new(file))
            }
        }
    }
}

/// One value submitted under the form key.
#[derive(Debug)]
pub enum FormEntry {
    File(SubmittedFile),
    /// A plain field with no filename.
    Text(String),
}

impl FormEntry {
    pub fn as_file(&self) -> Option<&SubmittedFile> {
        match self {
            FormEntry::File(file) => Some(file),
            FormEntry::Text(_) => None,
        }
    }

    pub fn into_file(self) -> Option<SubmittedFile> {
        match self {
            FormEntry::File(file) => Some(file),
            FormEntry::Text(_) => None,
        }
    }
}

impl From<SubmittedFile> for FormEntry {
    fn from(file: SubmittedFile) -> Self {
        FormEntry::File(file)
    }
}
