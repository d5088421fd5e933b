//! Multipart handling for the Markdown upload endpoint

use crate::services::upload::{FileContent, UploadRequest, UploadedFile};
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use mdpost_core::constants::{MARKDOWN_FILE_FIELD, MULTIPART_OVERHEAD_BYTES};
use mdpost_core::{AppError, UploadError};
use tokio::io::AsyncWriteExt;

/// Spool the first `markdown_file` field into a temporary file.
///
/// Other fields are read and discarded, up to `MULTIPART_OVERHEAD_BYTES` in total. A
/// `markdown_file` field without a file name counts as no file.
///
/// The upload route has no request body limit; this reader is the limit. At most
/// `max_size + 1` bytes of the file are read. A file that goes past that is returned marked
/// as truncated and the rest of the body is never read, so its extension is still checked
/// before its size.
pub async fn read_markdown_upload(
    mut multipart: Multipart,
    max_size: u64,
) -> Result<UploadRequest, AppError> {
    let mut discarded: usize = 0;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(MARKDOWN_FILE_FIELD) {
            discarded += drain_field(&mut field).await?;
            if discarded > MULTIPART_OVERHEAD_BYTES {
                return Err(AppError::InvalidInput(format!(
                    "Form fields other than '{}' exceed {} bytes",
                    MARKDOWN_FILE_FIELD, MULTIPART_OVERHEAD_BYTES
                )));
            }
            continue;
        }

        let Some(file_name) = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
        else {
            return Ok(UploadRequest::empty());
        };

        let temp = tempfile::NamedTempFile::new().map_err(UploadError::from)?;
        let (file, path) = temp.into_parts();
        let mut file = tokio::fs::File::from_std(file);
        let store_limit = max_size.saturating_add(1);
        let mut size: u64 = 0;
        let mut complete = true;

        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            let room = (store_limit - size).min(chunk.len() as u64) as usize;
            file.write_all(&chunk[..room])
                .await
                .map_err(UploadError::from)?;
            size += room as u64;

            if room < chunk.len() {
                complete = false;
                break;
            }
        }
        file.flush().await.map_err(UploadError::from)?;
        drop(file);

        tracing::debug!(file_name = %file_name, size, complete, "Markdown file received");
        let file = UploadedFile::new(file_name, size, FileContent::Spooled(path));
        return Ok(UploadRequest::new(if complete { file } else { file.truncated() }));
    }

    Ok(UploadRequest::empty())
}

async fn drain_field(field: &mut Field<'_>) -> Result<usize, AppError> {
    let mut read = 0;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        read += chunk.len();
        if read > MULTIPART_OVERHEAD_BYTES {
            break;
        }
    }
    Ok(read)
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
}
