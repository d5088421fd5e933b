//! Service initialization and application state setup

use crate::services::upload::UploadPipeline;
use crate::state::AppState;
use anyhow::Context;
use mdpost_cms::create_cms;
use mdpost_core::Config;
use mdpost_processing::CommonMarkConverter;
use std::sync::Arc;

/// Build the CMS backend and the upload pipeline on top of it.
pub async fn initialize_services(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let backends = create_cms(config)
        .await
        .context("Failed to initialize CMS backend")?;

    let pipeline =
        UploadPipeline::from_backends(&backends, Arc::new(CommonMarkConverter), config.entry);

    tracing::info!(
        backend = %backends.backend,
        entry_status = %config.entry.status,
        entry_type = %config.entry.entry_type,
        "Upload pipeline ready"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        pipeline,
        backend: backends.backend,
    }))
}
