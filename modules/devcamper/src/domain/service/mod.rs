use std::sync::Arc;

use query_core::TranslatorConfig;

use crate::contract::model::{Role, User};
use crate::domain::error::DomainError;
use crate::domain::ports::{Geocoder, PasswordHasher, TokenIssuer};
use crate::domain::repo::Repositories;

mod auth;
mod bootcamps;
mod courses;
mod reviews;
mod users;

/// Domain service with the business rules for bootcamps, courses, reviews
/// and accounts. Depends only on ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    repos: Repositories,
    geocoder: Arc<dyn Geocoder>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// List endpoint settings (page sizes, default sort).
    pub translator: TranslatorConfig,
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        repos: Repositories,
        geocoder: Arc<dyn Geocoder>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repos,
            geocoder,
            hasher,
            tokens,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Role gate: `user.role` must be one of `allowed`.
pub fn require_role(user: &User, allowed: &[Role]) -> Result<(), DomainError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(DomainError::RoleNotAllowed { role: user.role })
    }
}

/// Admins pass; everybody else must be `owner`.
fn ensure_owner(actor: &User, owner: Option<&str>, action: &str) -> Result<(), DomainError> {
    if actor.role == Role::Admin || owner == Some(actor.id.as_str()) {
        Ok(())
    } else {
        Err(DomainError::not_owner(&actor.id, action))
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests;
