use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EntryId;
use crate::constants::UPLOAD_SUCCESS_MESSAGE;

/// Body returned after a Markdown file became a content entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Always `success`
    #[schema(example = "success")]
    pub status: String,
    #[schema(example = "Post created successfully.")]
    pub message: String,
    /// Identifier of the created entry
    #[schema(value_type = u64, example = 42)]
    pub post_id: EntryId,
}

impl UploadResponse {
    pub fn created(post_id: EntryId) -> Self {
        Self {
            status: "success".to_string(),
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            post_id,
        }
    }
}

/// Liveness probe body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Content store backend in use
    #[schema(example = "local")]
    pub backend: String,
}
