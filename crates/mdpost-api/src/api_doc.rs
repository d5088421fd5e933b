//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use mdpost_core::models;

/// Registers the bearer API key scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "mdpost API",
        version = "0.1.0",
        description = "Turns uploaded Markdown files into published content entries. The first image referenced in the document becomes the entry's cover image. Protected endpoints are versioned under /api/v1/."
    ),
    paths(
        handlers::markdown_upload::upload_markdown,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::UploadResponse,
            models::HealthResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "markdown", description = "Markdown upload and entry creation"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
