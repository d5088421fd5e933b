use axum::http::HeaderValue;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// JSON responses load nothing, so everything is denied.
const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

/// The RapiDoc page pulls its script from a CDN and renders inline styles.
const DOCS_CSP: &str = "default-src 'self'; script-src 'self' https://unpkg.com; \
     style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; \
     font-src 'self' data: https:; connect-src 'self'; frame-ancestors 'none'";

/// Security headers configuration
#[derive(Clone)]
pub struct SecurityHeadersConfig {
    pub is_production: bool,
    pub docs_path: String,
}

impl SecurityHeadersConfig {
    pub fn new(is_production: bool, docs_path: impl Into<String>) -> Self {
        Self {
            is_production,
            docs_path: docs_path.into(),
        }
    }

    fn csp_for(&self, path: &str) -> &'static str {
        if path.starts_with(&self.docs_path) {
            DOCS_CSP
        } else {
            API_CSP
        }
    }
}

/// Security headers middleware
/// Adds security headers to all HTTP responses
pub async fn security_headers_middleware(
    State(config): State<Arc<SecurityHeadersConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let csp = config.csp_for(request.uri().path());
    let mut response = next.run(request).await;

    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    // HSTS only in production, where TLS terminates in front of the service
    if config.is_production {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    headers.insert("Content-Security-Policy", HeaderValue::from_static(csp));
    headers.insert(
        "Permissions-Policy",
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );

    // Upload responses identify entries of a single caller
    headers.insert(
        "Cache-Control",
        HeaderValue::from_static("no-store, private"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docs_get_relaxed_csp() {
        let config = SecurityHeadersConfig::new(false, "/docs");
        assert_eq!(config.csp_for("/docs"), DOCS_CSP);
        assert_eq!(config.csp_for("/docs/index.html"), DOCS_CSP);
        assert_eq!(config.csp_for("/api/v1/upload-markdown"), API_CSP);
    }
}
