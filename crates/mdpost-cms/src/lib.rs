//! mdpost CMS adapters
//!
//! This crate defines the ports the upload pipeline talks to (content store, media
//! library, image downloader) and their implementations: a WordPress REST client, a
//! filesystem-backed store for development, and an SSRF-guarded HTTP downloader.

pub mod download;
pub mod factory;
pub mod local;
pub mod ssrf;
pub mod traits;
pub mod wordpress;

// Re-export commonly used types
pub use download::HttpDownloader;
pub use factory::{create_cms, CmsBackends};
pub use local::LocalCms;
pub use mdpost_core::CmsBackend;
pub use traits::{CmsError, CmsResult, ContentStore, DownloadedFile, ImageDownloader, MediaLibrary};
pub use wordpress::WordPressClient;
