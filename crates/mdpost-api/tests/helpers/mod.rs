//! Test helpers: in-process fakes of the CMS ports and a router built around them.
//!
//! Run from workspace root: `cargo test -p mdpost-api`.

#![allow(dead_code)]

pub mod fakes;

use axum_test::TestServer;
use fakes::{FakeContentStore, FakeDownloader, FakeMediaLibrary};
use mdpost_api::setup::routes;
use mdpost_api::state::AppState;
use mdpost_api::UploadPipeline;
use mdpost_core::models::{AuthorId, UserRole};
use mdpost_core::{
    ApiKeyGrant, AuthConfig, BaseConfig, CmsBackend, CmsConfig, Config, EntryDefaults,
    ImportConfig, LogFormat,
};
use mdpost_processing::CommonMarkConverter;
use std::sync::Arc;

/// Master key; maps to an administrator with author id [`MASTER_AUTHOR_ID`].
pub const TEST_MASTER_API_KEY: &str = "test-master-api-key-0123456789";
pub const MASTER_AUTHOR_ID: u64 = 1;

pub const CONTRIBUTOR_API_KEY: &str = "contributor-key-abcdef";
pub const CONTRIBUTOR_AUTHOR_ID: u64 = 7;

pub const SUBSCRIBER_API_KEY: &str = "subscriber-key-abcdef";

pub const UPLOAD_PATH: &str = "/api/v1/upload-markdown";

pub fn test_config() -> Config {
    Config {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            http_concurrency_limit: 64,
            log_format: LogFormat::Compact,
        },
        cms: CmsConfig {
            backend: CmsBackend::Local,
            wordpress_url: None,
            wordpress_username: None,
            wordpress_app_password: None,
            request_timeout_secs: 5,
            local_path: "./data".to_string(),
            local_media_base_url: "http://localhost:4000/media".to_string(),
        },
        auth: AuthConfig {
            master_api_key: TEST_MASTER_API_KEY.to_string(),
            master_author_id: AuthorId(MASTER_AUTHOR_ID),
            api_keys: vec![
                ApiKeyGrant {
                    key: CONTRIBUTOR_API_KEY.to_string(),
                    author_id: AuthorId(CONTRIBUTOR_AUTHOR_ID),
                    role: UserRole::Contributor,
                },
                ApiKeyGrant {
                    key: SUBSCRIBER_API_KEY.to_string(),
                    author_id: AuthorId(8),
                    role: UserRole::Subscriber,
                },
            ],
        },
        import: ImportConfig {
            download_timeout_secs: 5,
            max_image_size_bytes: 1024 * 1024,
            url_allowlist: None,
            allow_private_hosts: false,
        },
        entry: EntryDefaults::default(),
    }
}

/// Test application: server plus handles on the fakes behind it.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<FakeContentStore>,
    pub media: Arc<FakeMediaLibrary>,
    pub downloader: Arc<FakeDownloader>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn build_pipeline(
    store: &Arc<FakeContentStore>,
    media: &Arc<FakeMediaLibrary>,
    downloader: &Arc<FakeDownloader>,
) -> UploadPipeline {
    UploadPipeline::new(
        Arc::new(CommonMarkConverter),
        store.clone(),
        media.clone(),
        downloader.clone(),
        EntryDefaults::default(),
    )
}

/// App whose collaborators all succeed.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(
        FakeContentStore::default(),
        FakeMediaLibrary::default(),
        FakeDownloader::default(),
    )
}

pub fn setup_test_app_with(
    store: FakeContentStore,
    media: FakeMediaLibrary,
    downloader: FakeDownloader,
) -> TestApp {
    let store = Arc::new(store);
    let media = Arc::new(media);
    let downloader = Arc::new(downloader);

    let config = test_config();
    let state = Arc::new(AppState {
        config: config.clone(),
        pipeline: build_pipeline(&store, &media, &downloader),
        backend: CmsBackend::Local,
    });

    let router = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        store,
        media,
        downloader,
    }
}
