use docstore::StoreError;
use thiserror::Error;

use crate::contract::model::Role;

/// One failed field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{resource} not found with id of {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("{}", join_messages(.errors))]
    Validation { errors: Vec<FieldError> },

    #[error("Email taken, please choose another email")]
    EmailTaken { email: String },

    #[error("User already reviewed this bootcamp before")]
    AlreadyReviewed { bootcamp_id: String },

    #[error("Please provide an email and password")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authorized to access this route")]
    Unauthenticated,

    #[error("User role {role} is not authorized to access this route")]
    RoleNotAllowed { role: Role },

    #[error("User {user_id} is not authorized to {action}")]
    NotOwner { user_id: String, action: String },

    #[error("Could not geocode address '{address}'")]
    AddressNotFound { address: String },

    #[error("Geocoder error: {message}")]
    Geocoder { message: String },

    #[error("Credential error: {message}")]
    Credentials { message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn not_owner(user_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self::NotOwner {
            user_id: user_id.into(),
            action: action.into(),
        }
    }

    pub fn geocoder(message: impl Into<String>) -> Self {
        Self::Geocoder {
            message: message.into(),
        }
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }
}
