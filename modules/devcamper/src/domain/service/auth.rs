use tracing::{debug, info, instrument, warn};

use super::Service;
use crate::contract::model::{Credentials, NewUser, Role, User};
use crate::domain::error::DomainError;

/// Roles open to self-registration.
const SELF_ASSIGNABLE: [Role; 2] = [Role::User, Role::Publisher];

impl Service {
    /// Create an account and sign a token for it.
    #[instrument(
        name = "devcamper.service.register",
        skip(self, input),
        fields(email = %input.email)
    )]
    pub async fn register(&self, input: NewUser) -> Result<(User, String), DomainError> {
        info!("Registering user");
        let user = self.insert_user(input, &SELF_ASSIGNABLE).await?;
        let token = self.tokens.issue(&user.id)?;
        info!("Successfully registered user with id={}", user.id);
        Ok((user, token))
    }

    #[instrument(name = "devcamper.service.login", skip(self, creds), fields(email = %creds.email))]
    pub async fn login(&self, creds: Credentials) -> Result<(User, String), DomainError> {
        debug!("Logging in");
        if creds.email.trim().is_empty() || creds.password.is_empty() {
            return Err(DomainError::MissingCredentials);
        }

        let Some((user, hash)) = self.repos.users.find_with_password(&creds.email).await? else {
            warn!("Login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };
        if !self.hasher.verify(&creds.password, &hash)? {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.id)?;
        info!(user_id = %user.id, "Successfully logged in");
        Ok((user, token))
    }

    /// Resolve a bearer token to its user. Unknown users count as
    /// unauthenticated.
    #[instrument(name = "devcamper.service.authenticate", skip_all)]
    pub async fn authenticate(&self, token: &str) -> Result<User, DomainError> {
        let user_id = self.tokens.verify(token)?;
        match self.repos.users.find_by_id(&user_id).await? {
            Some(user) => {
                debug!(user_id = %user.id, "Authenticated");
                Ok(user)
            }
            None => {
                debug!(%user_id, "Token for unknown user");
                Err(DomainError::Unauthenticated)
            }
        }
    }
}
