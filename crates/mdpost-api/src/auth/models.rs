use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mdpost_core::models::{AuthorId, Capability, UserRole};
use mdpost_core::AppError;

/// Authenticated caller, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    pub author_id: AuthorId,
    pub role: UserRole,
}

impl CallerContext {
    pub fn new(author_id: AuthorId, role: UserRole) -> Self {
        Self { author_id, role }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.has_capability(capability)
    }
}

// Extension cannot be combined with Multipart, so the context is read directly from the
// request parts.
impl<S> FromRequestParts<S> for CallerContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerContext>()
            .copied()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized("Missing caller context".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_caller_capabilities_follow_role() {
        let contributor = CallerContext::new(AuthorId(3), UserRole::Contributor);
        assert!(contributor.can(Capability::EditPosts));

        let subscriber = CallerContext::new(AuthorId(4), UserRole::Subscriber);
        assert!(!subscriber.can(Capability::EditPosts));
    }

    #[tokio::test]
    async fn test_extractor_reads_extensions() {
        let caller = CallerContext::new(AuthorId(7), UserRole::Editor);
        let (mut parts, _) = Request::builder()
            .extension(caller)
            .body(())
            .unwrap()
            .into_parts();

        let extracted = CallerContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, caller);
    }

    #[tokio::test]
    async fn test_extractor_rejects_missing_context() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let HttpAppError(err) = CallerContext::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
