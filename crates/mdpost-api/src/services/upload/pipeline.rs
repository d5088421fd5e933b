use mdpost_cms::{CmsBackends, ContentStore, ImageDownloader, MediaLibrary};
use mdpost_core::models::{EntryRef, NewEntry};
use mdpost_core::{EntryDefaults, UploadError};
use mdpost_processing::{derive_title, first_image_url, MarkdownConverter, MarkdownValidator};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use super::types::{CoverImageOutcome, UploadOutcome, UploadRequest};
use crate::auth::models::CallerContext;

/// Progress of one upload, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Validated,
    Converted,
    Extracted,
    EntryCreated,
    AttachmentAttempted,
    Completed,
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadStage::Received => write!(f, "received"),
            UploadStage::Validated => write!(f, "validated"),
            UploadStage::Converted => write!(f, "converted"),
            UploadStage::Extracted => write!(f, "extracted"),
            UploadStage::EntryCreated => write!(f, "entry_created"),
            UploadStage::AttachmentAttempted => write!(f, "attachment_attempted"),
            UploadStage::Completed => write!(f, "completed"),
        }
    }
}

fn enter(stage: UploadStage) {
    tracing::debug!(stage = %stage, "Upload stage reached");
}

fn failed(stage: UploadStage, error: impl Into<UploadError>) -> UploadError {
    let error = error.into();
    tracing::debug!(stage = %stage, error = %error, "Upload failed");
    error
}

/// Turns an uploaded Markdown file into a content entry with an optional cover image.
///
/// Collaborators are injected as trait objects so any backend (or a test fake) can be used.
#[derive(Clone)]
pub struct UploadPipeline {
    converter: Arc<dyn MarkdownConverter>,
    store: Arc<dyn ContentStore>,
    media: Arc<dyn MediaLibrary>,
    downloader: Arc<dyn ImageDownloader>,
    validator: MarkdownValidator,
    entry: EntryDefaults,
}

impl UploadPipeline {
    pub fn new(
        converter: Arc<dyn MarkdownConverter>,
        store: Arc<dyn ContentStore>,
        media: Arc<dyn MediaLibrary>,
        downloader: Arc<dyn ImageDownloader>,
        entry: EntryDefaults,
    ) -> Self {
        Self {
            converter,
            store,
            media,
            downloader,
            validator: MarkdownValidator::default(),
            entry,
        }
    }

    pub fn from_backends(
        backends: &CmsBackends,
        converter: Arc<dyn MarkdownConverter>,
        entry: EntryDefaults,
    ) -> Self {
        Self::new(
            converter,
            backends.content_store.clone(),
            backends.media_library.clone(),
            backends.downloader.clone(),
            entry,
        )
    }

    /// Largest file the pipeline accepts
    pub fn max_file_size(&self) -> u64 {
        self.validator.max_file_size()
    }

    /// Run the whole upload. Validation and entry creation failures are terminal; cover
    /// image failures are recorded in the outcome and never fail the upload.
    #[tracing::instrument(skip_all, name = "upload_pipeline")]
    pub async fn handle_upload(
        &self,
        caller: &CallerContext,
        request: UploadRequest,
    ) -> Result<UploadOutcome, UploadError> {
        enter(UploadStage::Received);
        let file = request
            .file
            .ok_or_else(|| failed(UploadStage::Received, UploadError::MissingFile))?;

        self.validator
            .validate_extension(file.file_name())
            .map_err(|e| failed(UploadStage::Received, e))?;
        if !file.is_complete() {
            return Err(failed(
                UploadStage::Received,
                UploadError::FileTooLarge {
                    size: None,
                    max: self.max_file_size(),
                },
            ));
        }
        self.validator
            .validate_file_size(file.size())
            .map_err(|e| failed(UploadStage::Received, e))?;
        enter(UploadStage::Validated);

        let content = file
            .read_content()
            .await
            .map_err(|e| failed(UploadStage::Validated, e))?;
        self.validator
            .validate_content(&content)
            .map_err(|e| failed(UploadStage::Validated, e))?;

        let title = derive_title(file.file_name());
        if let Err(e) = file.close() {
            tracing::debug!(error = %e, "Failed to remove spooled upload");
        }

        let markdown = String::from_utf8_lossy(&content);
        let body = self.converter.to_html(&markdown);
        enter(UploadStage::Converted);

        let image_url = first_image_url(&markdown);
        tracing::debug!(image_url = ?image_url, "Image reference extracted");
        enter(UploadStage::Extracted);

        let new_entry = NewEntry {
            title,
            body,
            status: self.entry.status,
            author: caller.author_id,
            entry_type: self.entry.entry_type,
        };
        let entry_id = self.store.create_entry(new_entry).await.map_err(|e| {
            tracing::error!(error = %e, "Content store rejected the entry");
            failed(
                UploadStage::Extracted,
                UploadError::PostCreationFailed(e.to_string()),
            )
        })?;
        tracing::info!(entry_id = %entry_id, "Entry created from Markdown upload");
        enter(UploadStage::EntryCreated);

        let cover_image = match image_url {
            Some(url) => {
                let entry = EntryRef {
                    id: entry_id,
                    entry_type: self.entry.entry_type,
                };
                let outcome = self.attach_cover_image(entry, &url).await;
                enter(UploadStage::AttachmentAttempted);
                outcome
            }
            None => CoverImageOutcome::NotRequested,
        };

        enter(UploadStage::Completed);
        Ok(UploadOutcome {
            entry_id,
            cover_image,
        })
    }

    /// Download, sideload and link the cover image. Best effort.
    async fn attach_cover_image(&self, entry: EntryRef, url: &str) -> CoverImageOutcome {
        let file = match self.downloader.download(url).await {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(entry_id = %entry.id, url = %url, error = %e, "Cover image download failed");
                return CoverImageOutcome::Failed(e.to_string());
            }
        };

        let sideloaded = self.media.sideload(&file, entry).await;
        if let Err(e) = file.cleanup() {
            tracing::debug!(error = %e, "Failed to remove downloaded image");
        }

        let attachment_id = match sideloaded {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(entry_id = %entry.id, url = %url, error = %e, "Cover image sideload failed");
                return CoverImageOutcome::Failed(e.to_string());
            }
        };

        match self.media.set_cover_image(entry, attachment_id).await {
            Ok(()) => {
                tracing::info!(
                    entry_id = %entry.id,
                    attachment_id = %attachment_id,
                    "Cover image attached"
                );
                CoverImageOutcome::Attached(attachment_id)
            }
            Err(e) => {
                tracing::warn!(
                    entry_id = %entry.id,
                    attachment_id = %attachment_id,
                    error = %e,
                    "Setting cover image failed"
                );
                CoverImageOutcome::Failed(e.to_string())
            }
        }
    }
}
