//! API constants
//!
//! Routes are versioned under [`API_PREFIX`]. Handler path annotations for the OpenAPI
//! document must be literals, so they repeat the prefix.

/// Versioned prefix for every protected route
pub const API_PREFIX: &str = "/api/v1";

/// Path of the Markdown upload endpoint, relative to [`API_PREFIX`]
pub const UPLOAD_MARKDOWN_PATH: &str = "/upload-markdown";

/// Served OpenAPI document
pub const OPENAPI_JSON_PATH: &str = "/api/openapi.json";
