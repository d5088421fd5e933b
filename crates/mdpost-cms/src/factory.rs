use crate::{
    CmsBackend, CmsError, CmsResult, ContentStore, HttpDownloader, ImageDownloader, LocalCms,
    MediaLibrary, WordPressClient,
};
use mdpost_core::Config;
use std::sync::Arc;
use std::time::Duration;

/// The collaborators the upload pipeline needs, built for one backend
#[derive(Clone)]
pub struct CmsBackends {
    pub backend: CmsBackend,
    pub content_store: Arc<dyn ContentStore>,
    pub media_library: Arc<dyn MediaLibrary>,
    pub downloader: Arc<dyn ImageDownloader>,
}

/// Create the CMS backend selected by configuration
pub async fn create_cms(config: &Config) -> CmsResult<CmsBackends> {
    let downloader: Arc<dyn ImageDownloader> = Arc::new(HttpDownloader::new(&config.import)?);

    match config.cms.backend {
        CmsBackend::WordPress => {
            let url = config.cms.wordpress_url.as_deref().ok_or_else(|| {
                CmsError::ConfigError("WORDPRESS_URL not configured".to_string())
            })?;
            let username = config.cms.wordpress_username.clone().ok_or_else(|| {
                CmsError::ConfigError("WORDPRESS_USERNAME not configured".to_string())
            })?;
            let app_password = config.cms.wordpress_app_password.clone().ok_or_else(|| {
                CmsError::ConfigError("WORDPRESS_APP_PASSWORD not configured".to_string())
            })?;

            let client = Arc::new(WordPressClient::new(
                url,
                username,
                app_password,
                Duration::from_secs(config.cms.request_timeout_secs),
            )?);
            tracing::info!(url = %url, "Using WordPress CMS backend");

            Ok(CmsBackends {
                backend: CmsBackend::WordPress,
                content_store: client.clone(),
                media_library: client,
                downloader,
            })
        }

        CmsBackend::Local => {
            let store = Arc::new(
                LocalCms::new(&config.cms.local_path, config.cms.local_media_base_url.clone())
                    .await?,
            );
            tracing::info!(path = %config.cms.local_path, "Using local CMS backend");

            Ok(CmsBackends {
                backend: CmsBackend::Local,
                content_store: store.clone(),
                media_library: store,
                downloader,
            })
        }
    }
}
