//! Route configuration and setup

use crate::auth::middleware::{auth_middleware, require_capability, AuthState};
use crate::constants::{API_PREFIX, OPENAPI_JSON_PATH, UPLOAD_MARKDOWN_PATH};
use crate::handlers;
use crate::middleware::{
    request_id_middleware, security_headers_middleware, SecurityHeadersConfig,
};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use mdpost_core::constants::{MAX_MARKDOWN_FILE_SIZE, MULTIPART_OVERHEAD_BYTES};
use mdpost_core::models::Capability;
use mdpost_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const DOCS_PATH: &str = "/docs";

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState::from_config(&config.auth));

    // Public routes (no authentication required)
    let public_routes = public_routes();

    // Protected routes: authentication runs first, then the capability check. The upload
    // reader enforces its own size ceiling, so the route carries no body limit.
    let protected_routes = protected_routes()
        .layer(DefaultBodyLimit::disable())
        .layer(axum::middleware::from_fn_with_state(
            Capability::EditPosts,
            require_capability,
        ))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    let security_headers_config = Arc::new(SecurityHeadersConfig::new(
        config.is_production(),
        DOCS_PATH,
    ));

    let http_concurrency_limit = config.base.http_concurrency_limit.max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        max_markdown_bytes = MAX_MARKDOWN_FILE_SIZE,
        max_form_overhead_bytes = MULTIPART_OVERHEAD_BYTES,
        "HTTP limits configured"
    );

    let app = public_routes
        .merge(protected_routes)
        .with_state(state)
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_JSON_PATH).path(DOCS_PATH))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ));

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.base.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .base
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            OPENAPI_JSON_PATH,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

/// Protected routes (require a caller that can edit posts)
fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        &format!("{}{}", API_PREFIX, UPLOAD_MARKDOWN_PATH),
        post(handlers::markdown_upload::upload_markdown),
    )
}
