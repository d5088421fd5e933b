//! CMS capability traits
//!
//! The upload pipeline only sees these traits. Each backend implements the content store
//! and the media library; image downloads are a separate port so they can be faked in
//! tests without touching the store.

use async_trait::async_trait;
use mdpost_core::models::{AttachmentId, EntryId, EntryRef, NewEntry};
use std::path::Path;
use tempfile::TempPath;
use thiserror::Error;

/// CMS operation errors
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("Entry rejected: {0}")]
    EntryRejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("URL rejected: {0}")]
    UrlRejected(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Download timed out: {0}")]
    Timeout(String),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Sideload failed: {0}")]
    SideloadFailed(String),

    #[error("CMS backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for CMS operations
pub type CmsResult<T> = Result<T, CmsError>;

/// An image fetched into a temporary file.
///
/// The file is removed when this value is dropped; call [`DownloadedFile::cleanup`] to
/// remove it eagerly and observe failures.
#[derive(Debug)]
pub struct DownloadedFile {
    path: TempPath,
    file_name: String,
    content_type: String,
    size: u64,
    source_url: String,
}

impl DownloadedFile {
    pub fn new(
        path: TempPath,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            path,
            file_name: file_name.into(),
            content_type: content_type.into(),
            size,
            source_url: source_url.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Delete the temporary file now.
    pub fn cleanup(self) -> std::io::Result<()> {
        self.path.close()
    }
}

/// Creates content entries
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Persist a new entry and return the id the store assigned
    async fn create_entry(&self, entry: NewEntry) -> CmsResult<EntryId>;
}

/// Stores media attachments and links them to entries
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Import a downloaded file as an attachment of `entry`
    async fn sideload(&self, file: &DownloadedFile, entry: EntryRef) -> CmsResult<AttachmentId>;

    /// Make `attachment` the cover image of `entry`
    async fn set_cover_image(&self, entry: EntryRef, attachment: AttachmentId) -> CmsResult<()>;
}

/// Fetches remote images
#[async_trait]
pub trait ImageDownloader: Send + Sync {
    async fn download(&self, url: &str) -> CmsResult<DownloadedFile>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cleanup_removes_temporary_file() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"png").unwrap();
        let file = DownloadedFile::new(
            temp.into_temp_path(),
            "cat.png",
            "image/png",
            3,
            "https://example.com/cat.png",
        );
        let path = file.path().to_path_buf();
        assert!(path.exists());
        file.cleanup().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_temporary_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let file = DownloadedFile::new(temp.into_temp_path(), "x.png", "image/png", 0, "");
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());
    }
}
