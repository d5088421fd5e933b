//! Configuration validation
//!
//! Checks at startup that go beyond what `Config::validate` enforces while parsing.

use anyhow::Result;
use mdpost_core::{CmsBackend, Config};

/// Validate critical configuration values
///
/// Fails on settings that would make the service insecure in production and warns on
/// settings that are legal but unusual.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();

    if is_production && config.base.cors_origins.iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via the CORS_ORIGINS environment variable."
        ));
    }

    if is_production && config.import.allow_private_hosts {
        return Err(anyhow::anyhow!(
            "ALLOW_PRIVATE_IMAGE_HOSTS cannot be enabled in production"
        ));
    }

    if config.import.allow_private_hosts {
        tracing::warn!(
            "ALLOW_PRIVATE_IMAGE_HOSTS is enabled - cover images may be fetched from internal addresses"
        );
    }

    if config.cms.backend == CmsBackend::WordPress {
        if let Some(url) = config.cms.wordpress_url.as_deref() {
            if is_production && url.starts_with("http://") {
                tracing::warn!(
                    url = %url,
                    "WORDPRESS_URL uses plain HTTP - application password is sent unencrypted"
                );
            }
        }
    }

    if config.base.http_concurrency_limit == 0 {
        return Err(anyhow::anyhow!("HTTP concurrency limit cannot be 0"));
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
