//! Application state shared by every handler

use crate::services::upload::UploadPipeline;
use mdpost_core::{CmsBackend, Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: UploadPipeline,
    pub backend: CmsBackend,
}
