//! Types exchanged between the upload handler and the pipeline

use bytes::Bytes;
use mdpost_core::models::{AttachmentId, EntryId};
use std::io;
use tempfile::TempPath;

/// Inbound upload: the file, if the form carried one
#[derive(Debug, Default)]
pub struct UploadRequest {
    pub file: Option<UploadedFile>,
}

impl UploadRequest {
    pub fn new(file: UploadedFile) -> Self {
        Self { file: Some(file) }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Where the uploaded bytes live until the pipeline reads them
#[derive(Debug)]
pub enum FileContent {
    /// Spooled to a temporary file, removed on drop
    Spooled(TempPath),
    InMemory(Bytes),
}

/// One uploaded file as received by the transport layer
#[derive(Debug)]
pub struct UploadedFile {
    file_name: String,
    size: u64,
    content: FileContent,
    complete: bool,
}

impl UploadedFile {
    /// `size` is the number of bytes the client sent, which may exceed what was stored.
    pub fn new(file_name: impl Into<String>, size: u64, content: FileContent) -> Self {
        Self {
            file_name: file_name.into(),
            size,
            content,
            complete: true,
        }
    }

    /// Mark the file as cut short: reading stopped past the size ceiling, so `size` is only
    /// what was read.
    pub fn truncated(mut self) -> Self {
        self.complete = false;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn in_memory(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self::new(file_name, data.len() as u64, FileContent::InMemory(data))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Load the stored bytes.
    pub async fn read_content(&self) -> io::Result<Bytes> {
        match &self.content {
            FileContent::Spooled(path) => tokio::fs::read(path).await.map(Bytes::from),
            FileContent::InMemory(data) => Ok(data.clone()),
        }
    }

    /// Remove the spooled file now instead of on drop.
    pub fn close(self) -> io::Result<()> {
        match self.content {
            FileContent::Spooled(path) => path.close(),
            FileContent::InMemory(_) => Ok(()),
        }
    }
}

/// What happened to the cover image of a created entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverImageOutcome {
    /// The document had no image reference
    NotRequested,
    Attached(AttachmentId),
    /// Download, sideload or linking failed; the entry was kept
    Failed(String),
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub entry_id: EntryId,
    pub cover_image: CoverImageOutcome,
}
