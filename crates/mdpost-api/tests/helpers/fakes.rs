//! Recording fakes of the CMS ports

use async_trait::async_trait;
use mdpost_cms::{CmsError, CmsResult, ContentStore, DownloadedFile, ImageDownloader, MediaLibrary};
use mdpost_core::models::{AttachmentId, EntryId, EntryRef, NewEntry};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Content store handing out ids 1, 2, 3, ...
#[derive(Default)]
pub struct FakeContentStore {
    entries: Mutex<Vec<(EntryId, NewEntry)>>,
    fail: bool,
}

impl FakeContentStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn entries(&self) -> Vec<(EntryId, NewEntry)> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentStore for FakeContentStore {
    async fn create_entry(&self, entry: NewEntry) -> CmsResult<EntryId> {
        if self.fail {
            return Err(CmsError::BackendError("store unavailable".to_string()));
        }
        let mut entries = self.entries.lock().unwrap();
        let id = EntryId(entries.len() as u64 + 1);
        entries.push((id, entry));
        Ok(id)
    }
}

/// A sideload as seen by the media library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sideload {
    pub entry: EntryRef,
    pub file_name: String,
    pub source_url: String,
    /// Whether the temporary file still existed when it was handed over
    pub file_present: bool,
}

/// Media library handing out attachment ids 100, 101, ...
#[derive(Default)]
pub struct FakeMediaLibrary {
    sideloads: Mutex<Vec<Sideload>>,
    covers: Mutex<Vec<(EntryRef, AttachmentId)>>,
    fail_sideload: bool,
    fail_cover: bool,
}

impl FakeMediaLibrary {
    pub fn failing_sideload() -> Self {
        Self {
            fail_sideload: true,
            ..Default::default()
        }
    }

    pub fn failing_cover() -> Self {
        Self {
            fail_cover: true,
            ..Default::default()
        }
    }

    pub fn sideloads(&self) -> Vec<Sideload> {
        self.sideloads.lock().unwrap().clone()
    }

    pub fn covers(&self) -> Vec<(EntryRef, AttachmentId)> {
        self.covers.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaLibrary for FakeMediaLibrary {
    async fn sideload(&self, file: &DownloadedFile, entry: EntryRef) -> CmsResult<AttachmentId> {
        let mut sideloads = self.sideloads.lock().unwrap();
        sideloads.push(Sideload {
            entry,
            file_name: file.file_name().to_string(),
            source_url: file.source_url().to_string(),
            file_present: file.path().exists(),
        });
        if self.fail_sideload {
            return Err(CmsError::SideloadFailed("media library rejected file".to_string()));
        }
        Ok(AttachmentId(99 + sideloads.len() as u64))
    }

    async fn set_cover_image(&self, entry: EntryRef, attachment: AttachmentId) -> CmsResult<()> {
        if self.fail_cover {
            return Err(CmsError::BackendError("cover image update failed".to_string()));
        }
        self.covers.lock().unwrap().push((entry, attachment));
        Ok(())
    }
}

/// Downloader that writes a few bytes to a real temporary file
#[derive(Default)]
pub struct FakeDownloader {
    requested: Mutex<Vec<String>>,
    paths: Mutex<Vec<PathBuf>>,
    fail: bool,
}

impl FakeDownloader {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    /// Temporary files handed out so far
    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageDownloader for FakeDownloader {
    async fn download(&self, url: &str) -> CmsResult<DownloadedFile> {
        self.requested.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(CmsError::DownloadFailed(format!("{} is unreachable", url)));
        }

        let mut temp = tempfile::NamedTempFile::new()?;
        temp.write_all(b"\x89PNG")?;
        let path = temp.into_temp_path();
        self.paths.lock().unwrap().push(path.to_path_buf());

        Ok(DownloadedFile::new(path, "cat.png", "image/png", 4, url))
    }
}
