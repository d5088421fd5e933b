//! Configuration module
//!
//! Settings are read from the process environment (a `.env` file is honoured) into
//! `Config`, grouped by concern: server, content store, authentication, image import
//! and the defaults applied to new entries.

use std::env;
use std::str::FromStr;

use crate::cms_types::CmsBackend;
use crate::models::{AuthorId, EntryStatus, EntryType, UserRole};

const SERVER_PORT: u16 = 4000;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;
const CMS_REQUEST_TIMEOUT_SECS: u64 = 30;
const MASTER_AUTHOR_ID: u64 = 1;
const MIN_MASTER_KEY_LEN: usize = 16;
const IMAGE_DOWNLOAD_TIMEOUT_SECS: u64 = 30;
const IMAGE_MAX_SIZE_MB: u64 = 10;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" | "text" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid LOG_FORMAT: {}", s)),
        }
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub http_concurrency_limit: usize,
    pub log_format: LogFormat,
}

/// Content store backend settings
#[derive(Clone, Debug)]
pub struct CmsConfig {
    pub backend: CmsBackend,
    pub wordpress_url: Option<String>,
    pub wordpress_username: Option<String>,
    pub wordpress_app_password: Option<String>,
    pub request_timeout_secs: u64,
    pub local_path: String,
    pub local_media_base_url: String,
}

/// An additional API key and the identity it authenticates as
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKeyGrant {
    pub key: String,
    pub author_id: AuthorId,
    pub role: UserRole,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub master_api_key: String,
    pub master_author_id: AuthorId,
    pub api_keys: Vec<ApiKeyGrant>,
}

// Keys stay out of debug output.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("master_api_key", &"<redacted>")
            .field("master_author_id", &self.master_author_id)
            .field("api_keys", &self.api_keys.len())
            .finish()
    }
}

/// Cover image download settings
#[derive(Clone, Debug)]
pub struct ImportConfig {
    pub download_timeout_secs: u64,
    pub max_image_size_bytes: u64,
    /// If set, only image URLs on these hosts (or their subdomains) are fetched
    pub url_allowlist: Option<Vec<String>>,
    pub allow_private_hosts: bool,
}

/// Values applied to every entry created from an upload
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryDefaults {
    pub status: EntryStatus,
    pub entry_type: EntryType,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub cms: CmsConfig,
    pub auth: AuthConfig,
    pub import: ImportConfig,
    pub entry: EntryDefaults,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(HTTP_CONCURRENCY_LIMIT),
            log_format: env::var("LOG_FORMAT")
                .ok()
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
        };

        let cms = CmsConfig {
            backend: env::var("CMS_BACKEND")
                .ok()
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or(CmsBackend::Local),
            wordpress_url: env::var("WORDPRESS_URL").ok().filter(|s| !s.is_empty()),
            wordpress_username: env::var("WORDPRESS_USERNAME")
                .ok()
                .filter(|s| !s.is_empty()),
            wordpress_app_password: env::var("WORDPRESS_APP_PASSWORD")
                .ok()
                .filter(|s| !s.is_empty()),
            request_timeout_secs: env::var("CMS_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| CMS_REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CMS_REQUEST_TIMEOUT_SECS),
            local_path: env::var("LOCAL_CMS_PATH").unwrap_or_else(|_| "./data".to_string()),
            local_media_base_url: env::var("LOCAL_MEDIA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4000/media".to_string()),
        };

        let auth = AuthConfig {
            master_api_key: env::var("MASTER_API_KEY")
                .map_err(|_| anyhow::anyhow!("MASTER_API_KEY must be set for authentication"))?,
            master_author_id: AuthorId(
                env::var("MASTER_AUTHOR_ID")
                    .unwrap_or_else(|_| MASTER_AUTHOR_ID.to_string())
                    .parse()
                    .map_err(|_| anyhow::anyhow!("MASTER_AUTHOR_ID must be a valid number"))?,
            ),
            api_keys: parse_api_keys(&env::var("API_KEYS").unwrap_or_default())?,
        };

        let import = ImportConfig {
            download_timeout_secs: env::var("IMAGE_DOWNLOAD_TIMEOUT_SECS")
                .unwrap_or_else(|_| IMAGE_DOWNLOAD_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(IMAGE_DOWNLOAD_TIMEOUT_SECS),
            max_image_size_bytes: env::var("IMAGE_MAX_SIZE_MB")
                .unwrap_or_else(|_| IMAGE_MAX_SIZE_MB.to_string())
                .parse::<u64>()
                .unwrap_or(IMAGE_MAX_SIZE_MB)
                * 1024
                * 1024,
            url_allowlist: env::var("IMAGE_URL_ALLOWLIST")
                .ok()
                .map(|s| parse_list(&s))
                .filter(|list| !list.is_empty()),
            allow_private_hosts: env::var("ALLOW_PRIVATE_IMAGE_HOSTS")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
        };

        let entry = EntryDefaults {
            status: env::var("ENTRY_STATUS")
                .ok()
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
            entry_type: env::var("ENTRY_TYPE")
                .ok()
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
        };

        let config = Config {
            base,
            cms,
            auth,
            import,
            entry,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.auth.master_api_key.len() < MIN_MASTER_KEY_LEN {
            return Err(anyhow::anyhow!(
                "MASTER_API_KEY must be at least {} characters long",
                MIN_MASTER_KEY_LEN
            ));
        }

        if self
            .auth
            .api_keys
            .iter()
            .any(|grant| grant.key == self.auth.master_api_key)
        {
            return Err(anyhow::anyhow!(
                "API_KEYS must not reuse MASTER_API_KEY"
            ));
        }

        if self.import.download_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "IMAGE_DOWNLOAD_TIMEOUT_SECS must be greater than zero"
            ));
        }

        match self.cms.backend {
            CmsBackend::WordPress => {
                let url = self.cms.wordpress_url.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("WORDPRESS_URL must be set when using the wordpress backend")
                })?;
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(anyhow::anyhow!(
                        "WORDPRESS_URL must start with http:// or https://"
                    ));
                }
                if self.cms.wordpress_username.is_none()
                    || self.cms.wordpress_app_password.is_none()
                {
                    return Err(anyhow::anyhow!(
                        "WORDPRESS_USERNAME and WORDPRESS_APP_PASSWORD must be set when using the wordpress backend"
                    ));
                }
            }
            CmsBackend::Local => {
                if self.cms.local_path.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_CMS_PATH must not be empty when using the local backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse `key:author_id:role` entries separated by commas.
pub fn parse_api_keys(value: &str) -> Result<Vec<ApiKeyGrant>, anyhow::Error> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.rsplitn(3, ':');
            let (role, author_id, key) = match (parts.next(), parts.next(), parts.next()) {
                (Some(role), Some(author_id), Some(key)) if !key.is_empty() => {
                    (role, author_id, key)
                }
                _ => {
                    return Err(anyhow::anyhow!(
                        "API_KEYS entries must look like key:author_id:role"
                    ))
                }
            };
            Ok(ApiKeyGrant {
                key: key.to_string(),
                author_id: AuthorId(author_id.trim().parse().map_err(|_| {
                    anyhow::anyhow!("API_KEYS author id must be a number: {}", author_id)
                })?),
                role: role.parse()?,
            })
        })
        .collect()
}
