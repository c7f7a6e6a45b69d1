use crate::domain::error::DomainError;

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// `Ok(false)` on mismatch; `Err` only when `hash` is unreadable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}

/// Signs and checks bearer tokens carrying a user id.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: &str) -> Result<String, DomainError>;

    /// The user id the token was issued for. Expired, malformed or foreign
    /// tokens are [`DomainError::Unauthenticated`].
    fn verify(&self, token: &str) -> Result<String, DomainError>;
}
