use chrono::Utc;
use query_core::{ParamMap, ResultEnvelope};
use tracing::{debug, info, instrument};

use super::{new_id, Service};
use crate::contract::model::{NewUser, Role, User, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::validation::{Violations, MIN_PASSWORD_LEN};

const USER: &str = "User";

/// Roles an admin may hand out.
const ADMIN_ASSIGNABLE: [Role; 3] = [Role::User, Role::Publisher, Role::Admin];

impl Service {
    #[instrument(name = "devcamper.service.list_users", skip(self, params))]
    pub async fn list_users(&self, params: &ParamMap) -> Result<ResultEnvelope, DomainError> {
        debug!("Listing users");
        let page = self
            .repos
            .users
            .list(params, &self.config.translator)
            .await?;
        debug!("Listed {} users", page.count);
        Ok(page)
    }

    #[instrument(name = "devcamper.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &str) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.repos
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(USER, id))
    }

    /// Admin account creation; any role may be assigned.
    #[instrument(
        name = "devcamper.service.create_user",
        skip(self, input),
        fields(email = %input.email)
    )]
    pub async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");
        let user = self.insert_user(input, &ADMIN_ASSIGNABLE).await?;
        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    /// Admin edit of name and email.
    #[instrument(name = "devcamper.service.update_user", skip(self, patch), fields(user_id = %id))]
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");

        let mut current = self.get_user(id).await?;

        let mut v = Violations::new();
        if let Some(name) = &patch.name {
            v.required(name, "name", "Please add a name");
        }
        if let Some(email) = &patch.email {
            v.email(email);
        }
        v.into_result()?;

        if let Some(email) = &patch.email {
            if email != &current.email && self.repos.users.email_exists(email).await? {
                return Err(DomainError::EmailTaken {
                    email: email.clone(),
                });
            }
        }

        if let Some(name) = patch.name {
            current.name = name;
        }
        if let Some(email) = patch.email {
            current.email = email;
        }

        let updated = self
            .repos
            .users
            .update(current)
            .await?
            .ok_or_else(|| DomainError::not_found(USER, id))?;
        info!("Successfully updated user");
        Ok(updated)
    }

    #[instrument(name = "devcamper.service.delete_user", skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &str) -> Result<(), DomainError> {
        info!("Deleting user");
        if !self.repos.users.delete(id).await? {
            return Err(DomainError::not_found(USER, id));
        }
        info!("Successfully deleted user");
        Ok(())
    }

    /// Validate, hash and store a new account.
    pub(super) async fn insert_user(
        &self,
        input: NewUser,
        assignable: &[Role],
    ) -> Result<User, DomainError> {
        let mut v = Violations::new();
        v.required(&input.name, "name", "Please add a name");
        if input.email.trim().is_empty() {
            v.push("email", "Please add an email");
        } else {
            v.email(&input.email);
        }
        if input.password.is_empty() {
            v.push("password", "Please add a password");
        } else {
            v.check(
                input.password.chars().count() >= MIN_PASSWORD_LEN,
                "password",
                "Please enter a password with more than length 6",
            );
        }
        let role = v.role(input.role.as_deref(), assignable);
        v.into_result()?;

        if self.repos.users.email_exists(&input.email).await? {
            return Err(DomainError::EmailTaken { email: input.email });
        }

        let hash = self.hasher.hash(&input.password)?;
        let user = User {
            id: new_id(),
            name: input.name,
            email: input.email,
            role,
            created_at: Utc::now(),
        };
        Ok(self.repos.users.insert(user, hash).await?)
    }
}
