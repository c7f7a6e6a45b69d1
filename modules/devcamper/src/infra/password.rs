//! Argon2id adapter for the [`PasswordHasher`] port.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::domain::error::DomainError;
use crate::domain::ports::PasswordHasher;

/// Argon2id with PHC-string output; the salt and parameters travel inside
/// the stored hash.
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    argon: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom cost (memory in KiB, iterations); used to keep tests fast.
    pub fn with_params(m_cost: u32, t_cost: u32) -> Result<Self, DomainError> {
        let params = Params::new(m_cost, t_cost, 1, None)
            .map_err(|e| DomainError::credentials(e.to_string()))?;
        Ok(Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        let salt =
            SaltString::encode_b64(&bytes).map_err(|e| DomainError::credentials(e.to_string()))?;
        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| DomainError::credentials(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| DomainError::credentials(e.to_string()))?;
        Ok(self
            .argon
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
