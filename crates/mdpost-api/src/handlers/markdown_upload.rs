use crate::auth::models::CallerContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::read_markdown_upload;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use mdpost_core::models::UploadResponse;
use mdpost_core::UploadError;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v1/upload-markdown",
    tag = "markdown",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "Markdown file (.md or .markdown, at most 5MB) in the `markdown_file` field"
    ),
    responses(
        (status = 200, description = "Entry created", body = UploadResponse),
        (status = 400, description = "Missing file, wrong extension or file too large", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 403, description = "Caller cannot edit posts", body = ErrorResponse),
        (status = 500, description = "File unreadable or entry creation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(author_id = %caller.author_id, operation = "upload_markdown")
)]
pub async fn upload_markdown(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    // A request that is not a multipart form carries no file.
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Request is not a multipart form");
        UploadError::MissingFile
    })?;
    let request = read_markdown_upload(multipart, state.pipeline.max_file_size()).await?;
    let outcome = state.pipeline.handle_upload(&caller, request).await?;

    tracing::debug!(
        entry_id = %outcome.entry_id,
        cover_image = ?outcome.cover_image,
        "Markdown upload handled"
    );

    Ok(Json(UploadResponse::created(outcome.entry_id)))
}
