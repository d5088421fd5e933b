//! WordPress REST API backend
//!
//! Entries are created through `/wp-json/wp/v2/{posts|pages}` and images are sideloaded
//! through `/wp-json/wp/v2/media`. Requests authenticate with an application password
//! over HTTP basic auth.

use async_trait::async_trait;
use mdpost_core::models::{AttachmentId, EntryId, EntryRef, NewEntry};
use mdpost_processing::file_name::sanitize_filename;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::traits::{CmsError, CmsResult, ContentStore, DownloadedFile, MediaLibrary};

#[derive(Serialize)]
struct CreateEntryRequest<'a> {
    title: &'a str,
    content: &'a str,
    status: &'a str,
    author: u64,
}

#[derive(Serialize)]
struct FeaturedMediaRequest {
    featured_media: u64,
}

#[derive(Deserialize)]
struct CreatedObject {
    id: u64,
}

/// Error body returned by the WordPress REST API
#[derive(Deserialize)]
struct WpErrorBody {
    code: String,
    message: String,
}

/// Failure of a single REST call, before it is mapped to the operation's error kind
enum RestFailure {
    Status(StatusCode, String),
    Transport(String),
}

impl RestFailure {
    fn into_cms_error(self, rejected: fn(String) -> CmsError) -> CmsError {
        match self {
            RestFailure::Status(StatusCode::NOT_FOUND, message) => CmsError::NotFound(message),
            RestFailure::Status(status, message) if status.is_client_error() => {
                rejected(format!("{}: {}", status, message))
            }
            RestFailure::Status(status, message) => {
                CmsError::BackendError(format!("{}: {}", status, message))
            }
            RestFailure::Transport(message) => CmsError::BackendError(message),
        }
    }
}

/// WordPress REST client
#[derive(Clone, Debug)]
pub struct WordPressClient {
    client: Client,
    base_url: String,
    username: String,
    app_password: String,
}

impl WordPressClient {
    /// Create a client for the site at `base_url` (e.g. `https://blog.example.com`)
    pub fn new(
        base_url: &str,
        username: String,
        app_password: String,
        timeout: Duration,
    ) -> CmsResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CmsError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            app_password,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/wp-json/wp/v2/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.app_password))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RestFailure> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| RestFailure::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = match serde_json::from_str::<WpErrorBody>(&body) {
                Ok(error) => format!("{}: {}", error.code, error.message),
                Err(_) => body,
            };
            return Err(RestFailure::Status(status, message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RestFailure::Transport(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl ContentStore for WordPressClient {
    #[tracing::instrument(skip(self, entry), fields(title = %entry.title, entry_type = %entry.entry_type))]
    async fn create_entry(&self, entry: NewEntry) -> CmsResult<EntryId> {
        let body = CreateEntryRequest {
            title: &entry.title,
            content: &entry.body,
            status: entry.status.as_str(),
            author: entry.author.0,
        };

        let created: CreatedObject = self
            .send(
                self.client
                    .post(self.endpoint(entry.entry_type.rest_base()))
                    .json(&body),
            )
            .await
            .map_err(|e| e.into_cms_error(CmsError::EntryRejected))?;

        tracing::debug!(entry_id = created.id, "WordPress entry created");
        Ok(EntryId(created.id))
    }
}

#[async_trait]
impl MediaLibrary for WordPressClient {
    #[tracing::instrument(skip(self, file), fields(entry_id = %entry.id, file_name = %file.file_name()))]
    async fn sideload(&self, file: &DownloadedFile, entry: EntryRef) -> CmsResult<AttachmentId> {
        let data = tokio::fs::read(file.path()).await?;
        let file_name = sanitize_filename(file.file_name())
            .map_err(|e| CmsError::SideloadFailed(e.to_string()))?;

        let request = self
            .client
            .post(self.endpoint("media"))
            .query(&[("post", entry.id.0)])
            .header(reqwest::header::CONTENT_TYPE, file.content_type())
            .header(
                reqwest::header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            )
            .body(data);

        let created: CreatedObject = self
            .send(request)
            .await
            .map_err(|e| e.into_cms_error(CmsError::SideloadFailed))?;

        tracing::debug!(attachment_id = created.id, "WordPress media sideloaded");
        Ok(AttachmentId(created.id))
    }

    #[tracing::instrument(skip(self), fields(entry_id = %entry.id))]
    async fn set_cover_image(&self, entry: EntryRef, attachment: AttachmentId) -> CmsResult<()> {
        let path = format!("{}/{}", entry.entry_type.rest_base(), entry.id);
        let _: serde_json::Value = self
            .send(
                self.client
                    .post(self.endpoint(&path))
                    .json(&FeaturedMediaRequest {
                        featured_media: attachment.0,
                    }),
            )
            .await
            .map_err(|e| e.into_cms_error(CmsError::BackendError))?;
        Ok(())
    }
}
