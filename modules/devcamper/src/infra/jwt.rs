//! HS256 bearer tokens for the [`TokenIssuer`] port.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::ports::TokenIssuer;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtTokenIssuer {
    pub fn new(secret: &str, expire_days: u32) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(i64::from(expire_days)),
        }
    }

    fn validation() -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.set_required_spec_claims(&["exp", "sub"]);
        v.leeway = 0;
        v
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user_id: &str) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::credentials(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<String, DomainError> {
        decode::<Claims>(token, &self.decoding, &Self::validation())
            .map(|data| data.claims.sub)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                DomainError::Unauthenticated
            })
    }
}
