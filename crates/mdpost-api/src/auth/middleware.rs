use crate::auth::models::CallerContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mdpost_core::models::{AuthorId, Capability, UserRole};
use mdpost_core::{AppError, AuthConfig};
use std::sync::Arc;
use subtle::ConstantTimeEq;

const BEARER_PREFIX: &str = "Bearer ";

/// Keys accepted by [`auth_middleware`] and the identities they map to
#[derive(Clone)]
pub struct AuthState {
    pub master_api_key: String,
    pub master_author_id: AuthorId,
    pub api_keys: Vec<(String, CallerContext)>,
}

impl AuthState {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            master_api_key: config.master_api_key.clone(),
            master_author_id: config.master_author_id,
            api_keys: config
                .api_keys
                .iter()
                .map(|grant| {
                    (
                        grant.key.clone(),
                        CallerContext::new(grant.author_id, grant.role),
                    )
                })
                .collect(),
        }
    }

    /// Resolve a bearer token. Every configured key is compared so the time taken does not
    /// depend on which key matched.
    fn resolve(&self, token: &str) -> Option<CallerContext> {
        let mut caller = None;
        if secure_compare(token, &self.master_api_key) {
            caller = Some(CallerContext::new(
                self.master_author_id,
                UserRole::Administrator,
            ));
        }
        for (key, context) in &self.api_keys {
            if secure_compare(token, key) && caller.is_none() {
                caller = Some(*context);
            }
        }
        caller
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            tracing::debug!("Authentication failed: missing authorization header");
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix(BEARER_PREFIX) else {
        tracing::debug!("Authentication failed: invalid authorization header format");
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    match auth_state.resolve(token.trim()) {
        Some(caller) => {
            tracing::debug!(
                author_id = %caller.author_id,
                role = %caller.role,
                "Authentication succeeded"
            );
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        None => {
            tracing::warn!("Authentication failed: invalid API key");
            HttpAppError(AppError::Unauthorized("Invalid API key".to_string())).into_response()
        }
    }
}

/// Reject callers whose role lacks the capability. Runs after [`auth_middleware`].
pub async fn require_capability(
    State(capability): State<Capability>,
    request: Request,
    next: Next,
) -> Response {
    let Some(caller) = request.extensions().get::<CallerContext>().copied() else {
        return HttpAppError(AppError::Unauthorized("Missing caller context".to_string()))
            .into_response();
    };

    if !caller.can(capability) {
        tracing::warn!(
            author_id = %caller.author_id,
            role = %caller.role,
            capability = %capability,
            "Caller lacks required capability"
        );
        return HttpAppError(AppError::Forbidden(format!(
            "Role '{}' lacks the '{}' capability",
            caller.role, capability
        )))
        .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_state() -> AuthState {
        AuthState {
            master_api_key: "master-key-0123456789".to_string(),
            master_author_id: AuthorId(1),
            api_keys: vec![
                (
                    "editor-key".to_string(),
                    CallerContext::new(AuthorId(5), UserRole::Editor),
                ),
                (
                    "reader-key".to_string(),
                    CallerContext::new(AuthorId(9), UserRole::Subscriber),
                ),
            ],
        }
    }

    #[test]
    fn test_secure_compare() {
        assert!(secure_compare("abc", "abc"));
        assert!(!secure_compare("abc", "abd"));
        assert!(!secure_compare("abc", "abcd"));
    }

    #[test]
    fn test_master_key_is_administrator() {
        let caller = auth_state().resolve("master-key-0123456789").unwrap();
        assert_eq!(caller.author_id, AuthorId(1));
        assert_eq!(caller.role, UserRole::Administrator);
    }

    #[test]
    fn test_configured_keys_resolve() {
        let state = auth_state();
        assert_eq!(
            state.resolve("editor-key"),
            Some(CallerContext::new(AuthorId(5), UserRole::Editor))
        );
        assert_eq!(
            state.resolve("reader-key").map(|c| c.role),
            Some(UserRole::Subscriber)
        );
        assert_eq!(state.resolve("unknown"), None);
    }
}
