//! Bearer-token extractor and role gate for protected routes.

use std::sync::Arc;

use apikit::ProblemResponse;
use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use tracing::debug;

use crate::api::rest::error::map_domain_error;
use crate::contract::model::{Role, User};
use crate::domain::error::DomainError;
use crate::domain::service::{require_role, Service};

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    /// 403 unless the caller holds one of `roles`.
    pub fn require(&self, roles: &[Role], instance: &str) -> Result<(), ProblemResponse> {
        require_role(&self.0, roles).map_err(|e| {
            debug!(user_id = %self.0.id, role = %self.0.role, "role rejected");
            map_domain_error(&e, instance)
        })
    }
}

/// Token after `Bearer `, if the header has that shape.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let instance = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path(), |o| o.0.path())
            .to_string();
        let token = bearer_token(&parts.headers);
        let service = parts.extensions.get::<Arc<Service>>().cloned();

        async move {
            let Some(service) = service else {
                tracing::error!("devcamper service missing from request extensions");
                return Err(apikit::internal_error("An internal error occurred"));
            };
            let Some(token) = token else {
                return Err(map_domain_error(&DomainError::Unauthenticated, &instance));
            };
            service
                .authenticate(&token)
                .await
                .map(AuthUser)
                .map_err(|e| match e {
                    DomainError::Store(_) => map_domain_error(&e, &instance),
                    _ => map_domain_error(&DomainError::Unauthenticated, &instance),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_parsing() {
        let mut h = HeaderMap::new();
        assert_eq!(bearer_token(&h), None);

        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&h).as_deref(), Some("abc.def"));

        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&h), None);

        h.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&h), None);
    }
}
