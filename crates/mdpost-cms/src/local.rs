//! Local filesystem backend
//!
//! Layout under the root directory:
//!
//! - `entries/{id}.json` - content entries
//! - `attachments/{id}.json` - attachment records
//! - `media/{id}/{file name}` - attachment bytes
//!
//! Entries and attachments draw from one id sequence, recovered from disk on start-up.

use async_trait::async_trait;
use chrono::Utc;
use mdpost_core::models::{AttachmentId, ContentEntry, EntryId, EntryRef, MediaAttachment, NewEntry};
use mdpost_processing::file_name::sanitize_filename;
use mdpost_processing::mime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::traits::{CmsError, CmsResult, ContentStore, DownloadedFile, MediaLibrary};

const ENTRIES_DIR: &str = "entries";
const ATTACHMENTS_DIR: &str = "attachments";
const MEDIA_DIR: &str = "media";

/// Filesystem-backed content store and media library
pub struct LocalCms {
    base_path: PathBuf,
    media_base_url: String,
    /// Last id handed out. Held while writing so allocation and writes are serialised.
    last_id: Mutex<u64>,
}

impl LocalCms {
    /// Open (or create) a store rooted at `base_path`.
    ///
    /// `media_base_url` is the public URL prefix recorded on attachments
    /// (e.g. `http://localhost:4000/media`).
    pub async fn new(base_path: impl Into<PathBuf>, media_base_url: String) -> CmsResult<Self> {
        let base_path = base_path.into();

        for dir in [ENTRIES_DIR, ATTACHMENTS_DIR, MEDIA_DIR] {
            let path = base_path.join(dir);
            fs::create_dir_all(&path).await.map_err(|e| {
                CmsError::ConfigError(format!(
                    "Failed to create directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        let last_id = std::cmp::max(
            max_record_id(&base_path.join(ENTRIES_DIR)).await?,
            max_record_id(&base_path.join(ATTACHMENTS_DIR)).await?,
        );

        tracing::debug!(path = %base_path.display(), last_id, "Local CMS opened");

        Ok(Self {
            base_path,
            media_base_url: media_base_url.trim_end_matches('/').to_string(),
            last_id: Mutex::new(last_id),
        })
    }

    fn entry_path(&self, id: EntryId) -> PathBuf {
        self.base_path.join(ENTRIES_DIR).join(format!("{}.json", id))
    }

    fn attachment_path(&self, id: AttachmentId) -> PathBuf {
        self.base_path
            .join(ATTACHMENTS_DIR)
            .join(format!("{}.json", id))
    }

    pub async fn get_entry(&self, id: EntryId) -> CmsResult<ContentEntry> {
        read_record(&self.entry_path(id), || format!("entry {}", id)).await
    }

    pub async fn get_attachment(&self, id: AttachmentId) -> CmsResult<MediaAttachment> {
        read_record(&self.attachment_path(id), || format!("attachment {}", id)).await
    }

    async fn write_attachment(
        &self,
        id: AttachmentId,
        entry: EntryRef,
        file: &DownloadedFile,
        file_name: String,
    ) -> CmsResult<()> {
        let record = MediaAttachment {
            id,
            entry_id: entry.id,
            url: format!("{}/{}/{}", self.media_base_url, id, file_name),
            file_name,
            content_type: mime::essence(file.content_type()),
            file_size: file.size(),
            source_url: file.source_url().to_string(),
            created_at: Utc::now(),
        };
        write_record(&self.attachment_path(id), &record).await
    }
}

async fn max_record_id(dir: &Path) -> CmsResult<u64> {
    let mut max = 0;
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let id = name
            .to_str()
            .and_then(|n| n.strip_suffix(".json"))
            .and_then(|stem| stem.parse::<u64>().ok());
        if let Some(id) = id {
            max = max.max(id);
        }
    }
    Ok(max)
}

async fn read_record<T: DeserializeOwned>(
    path: &Path,
    describe: impl FnOnce() -> String,
) -> CmsResult<T> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CmsError::NotFound(describe()))
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&data)
        .map_err(|e| CmsError::BackendError(format!("Corrupt record {}: {}", path.display(), e)))
}

/// Write via a temporary sibling and rename, so readers never see partial records.
async fn write_record<T: Serialize>(path: &Path, record: &T) -> CmsResult<()> {
    let data = serde_json::to_vec_pretty(record)
        .map_err(|e| CmsError::BackendError(format!("Failed to serialize record: {}", e)))?;
    let tmp_path = path.with_extension("json.tmp");

    let mut file = fs::File::create(&tmp_path).await?;
    file.write_all(&data).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp_path, path).await?;
    Ok(())
}

#[async_trait]
impl ContentStore for LocalCms {
    async fn create_entry(&self, entry: NewEntry) -> CmsResult<EntryId> {
        let mut last_id = self.last_id.lock().await;
        let id = EntryId(*last_id + 1);

        let record = ContentEntry::from_new(id, entry, Utc::now());
        write_record(&self.entry_path(id), &record)
            .await
            .map_err(|e| CmsError::EntryRejected(e.to_string()))?;
        *last_id = id.0;

        tracing::debug!(entry_id = %id, "Local entry created");
        Ok(id)
    }
}

#[async_trait]
impl MediaLibrary for LocalCms {
    async fn sideload(&self, file: &DownloadedFile, entry: EntryRef) -> CmsResult<AttachmentId> {
        if !mime::is_image_content_type(file.content_type()) {
            return Err(CmsError::UnsupportedMediaType(file.content_type().to_string()));
        }
        let file_name = sanitize_filename(file.file_name())
            .map_err(|e| CmsError::SideloadFailed(e.to_string()))?;

        let mut last_id = self.last_id.lock().await;
        self.get_entry(entry.id).await?;

        let id = AttachmentId(*last_id + 1);
        let media_dir = self.base_path.join(MEDIA_DIR).join(id.to_string());
        fs::create_dir_all(&media_dir).await?;
        let stored = match fs::copy(file.path(), media_dir.join(&file_name)).await {
            Ok(_) => self.write_attachment(id, entry, file, file_name).await,
            Err(e) => Err(CmsError::SideloadFailed(format!("Failed to store media: {}", e))),
        };

        if let Err(e) = stored {
            if let Err(cleanup) = fs::remove_dir_all(&media_dir).await {
                tracing::warn!(path = %media_dir.display(), error = %cleanup, "Failed to remove orphaned media");
            }
            return Err(e);
        }
        *last_id = id.0;

        tracing::debug!(attachment_id = %id, entry_id = %entry.id, "Local media sideloaded");
        Ok(id)
    }

    async fn set_cover_image(&self, entry: EntryRef, attachment: AttachmentId) -> CmsResult<()> {
        let _guard = self.last_id.lock().await;
        let mut record = self.get_entry(entry.id).await?;
        self.get_attachment(attachment).await?;

        record.cover_image = Some(attachment);
        write_record(&self.entry_path(entry.id), &record).await
    }
}
