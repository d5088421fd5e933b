use async_trait::async_trait;
use mdpost_core::ImportConfig;
use mdpost_processing::file_name::split_extension;
use mdpost_processing::mime;
use percent_encoding::percent_decode_str;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::ssrf::{is_blocked_host, validate_url_for_ssrf, PublicAddrResolver};
use crate::traits::{CmsError, CmsResult, DownloadedFile, ImageDownloader};

const MAX_REDIRECTS: usize = 5;
const FALLBACK_FILE_NAME: &str = "image";

/// Downloads cover images over HTTP into temporary files.
///
/// The timeout covers the whole download, including SSRF validation and DNS.
#[derive(Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
    timeout: Duration,
    max_size: u64,
    allow_private_hosts: bool,
    allowlist: Option<Vec<String>>,
}

impl HttpDownloader {
    pub fn new(config: &ImportConfig) -> CmsResult<Self> {
        let allow_private_hosts = config.allow_private_hosts;
        let redirect_policy = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                return attempt.error("too many redirects");
            }
            let blocked = attempt
                .url()
                .host_str()
                .map(|host| !allow_private_hosts && is_blocked_host(host))
                .unwrap_or(true);
            if blocked {
                attempt.stop()
            } else {
                attempt.follow()
            }
        });

        let mut builder = reqwest::Client::builder().redirect(redirect_policy);
        if !allow_private_hosts {
            builder = builder.dns_resolver(Arc::new(PublicAddrResolver));
        }
        let client = builder
            .build()
            .map_err(|e| CmsError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(config.download_timeout_secs),
            max_size: config.max_image_size_bytes,
            allow_private_hosts,
            allowlist: config.url_allowlist.clone(),
        })
    }

    async fn fetch(&self, url: &str) -> CmsResult<DownloadedFile> {
        validate_url_for_ssrf(url, self.allow_private_hosts, self.allowlist.as_deref())
            .await
            .map_err(CmsError::UrlRejected)?;

        let parsed_url = reqwest::Url::parse(url)
            .map_err(|e| CmsError::UrlRejected(format!("Invalid URL format: {}", e)))?;

        let mut response = self
            .client
            .get(parsed_url.clone())
            .send()
            .await
            .map_err(|e| CmsError::DownloadFailed(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CmsError::DownloadFailed(format!(
                "URL returned status code: {}",
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_size {
                return Err(CmsError::TooLarge {
                    size: length,
                    max: self.max_size,
                });
            }
        }

        let header_content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(mime::essence)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let temp = tempfile::NamedTempFile::new()?;
        let (file, path) = temp.into_parts();
        let mut file = tokio::fs::File::from_std(file);
        let mut size: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CmsError::DownloadFailed(format!("Failed to read response body: {}", e)))?
        {
            size += chunk.len() as u64;
            if size > self.max_size {
                return Err(CmsError::TooLarge {
                    size,
                    max: self.max_size,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        let file_name = file_name_for(&parsed_url, &header_content_type);
        let content_type = if mime::is_image_content_type(&header_content_type) {
            header_content_type
        } else {
            mime::content_type_for_file_name(&file_name)
                .map(str::to_string)
                .unwrap_or(header_content_type)
        };

        tracing::debug!(
            url = %url,
            file_name = %file_name,
            content_type = %content_type,
            size = size,
            "Image downloaded"
        );

        Ok(DownloadedFile::new(path, file_name, content_type, size, url))
    }
}

/// Last path segment, percent-decoded. An extension is added from the content type when
/// the segment has none.
fn file_name_for(url: &reqwest::Url, content_type: &str) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

    let has_extension = matches!(split_extension(&segment), (_, Some(ext)) if !ext.is_empty());
    match mime::extension_for_content_type(content_type) {
        Some(ext) if !has_extension => format!("{}.{}", segment, ext),
        _ => segment,
    }
}

#[async_trait]
impl ImageDownloader for HttpDownloader {
    #[tracing::instrument(skip(self))]
    async fn download(&self, url: &str) -> CmsResult<DownloadedFile> {
        tokio::time::timeout(self.timeout, self.fetch(url))
            .await
            .map_err(|_| {
                CmsError::Timeout(format!("{} after {}s", url, self.timeout.as_secs()))
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import_config(max_image_size_bytes: u64, timeout_secs: u64) -> ImportConfig {
        ImportConfig {
            download_timeout_secs: timeout_secs,
            max_image_size_bytes,
            url_allowlist: None,
            allow_private_hosts: true,
        }
    }

    #[test]
    fn file_name_from_last_segment() {
        let url = reqwest::Url::parse("https://example.com/a/my%20cat.png?x=1").unwrap();
        assert_eq!(file_name_for(&url, "image/png"), "my cat.png");
    }

    #[test]
    fn file_name_gets_extension_from_content_type() {
        let url = reqwest::Url::parse("https://example.com/images/cat").unwrap();
        assert_eq!(file_name_for(&url, "image/jpeg"), "cat.jpg");
    }

    #[test]
    fn file_name_falls_back_when_path_is_empty() {
        let url = reqwest::Url::parse("https://example.com/").unwrap();
        assert_eq!(file_name_for(&url, "image/gif"), "image.gif");
        assert_eq!(file_name_for(&url, "text/plain"), "image");
    }

    #[tokio::test]
    async fn downloads_into_temporary_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/cat.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(b"\x89PNG\r\n\x1a\nfake".to_vec())
            .create_async()
            .await;

        let downloader = HttpDownloader::new(&import_config(1024, 5)).unwrap();
        let url = format!("{}/cat.png", server.url());
        let file = downloader.download(&url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(file.file_name(), "cat.png");
        assert_eq!(file.content_type(), "image/png");
        assert_eq!(file.size(), 12);
        assert_eq!(file.source_url(), url);
        assert_eq!(std::fs::read(file.path()).unwrap().len(), 12);

        let path = file.path().to_path_buf();
        file.cleanup().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn content_type_inferred_from_name_for_octet_stream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/photo.jpeg")
            .with_status(200)
            .with_header("content-type", "application/octet-stream")
            .with_body("jpeg")
            .create_async()
            .await;

        let downloader = HttpDownloader::new(&import_config(1024, 5)).unwrap();
        let file = downloader
            .download(&format!("{}/photo.jpeg", server.url()))
            .await
            .unwrap();
        assert_eq!(file.content_type(), "image/jpeg");
    }

    #[tokio::test]
    async fn non_success_status_is_download_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing.png")
            .with_status(404)
            .create_async()
            .await;

        let downloader = HttpDownloader::new(&import_config(1024, 5)).unwrap();
        let err = downloader
            .download(&format!("{}/missing.png", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, CmsError::DownloadFailed(_)), "{err}");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/big.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(vec![0u8; 2048])
            .create_async()
            .await;

        let downloader = HttpDownloader::new(&import_config(1024, 5)).unwrap();
        let err = downloader
            .download(&format!("{}/big.png", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, CmsError::TooLarge { max: 1024, .. }), "{err}");
    }

    #[tokio::test]
    async fn private_hosts_rejected_by_default() {
        let mut config = import_config(1024, 5);
        config.allow_private_hosts = false;
        let downloader = HttpDownloader::new(&config).unwrap();
        let err = downloader
            .download("http://127.0.0.1:9/cat.png")
            .await
            .unwrap_err();
        assert!(matches!(err, CmsError::UrlRejected(_)), "{err}");
    }

    #[tokio::test]
    async fn unreachable_host_is_download_failure() {
        let downloader = HttpDownloader::new(&import_config(1024, 5)).unwrap();
        let err = downloader
            .download("http://127.0.0.1:9/cat.png")
            .await
            .unwrap_err();
        assert!(
            matches!(err, CmsError::DownloadFailed(_) | CmsError::Timeout(_)),
            "{err}"
        );
    }
}
