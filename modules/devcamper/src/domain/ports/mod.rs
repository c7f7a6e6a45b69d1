pub mod geocoder;
pub mod security;

pub use geocoder::Geocoder;
pub use security::{PasswordHasher, TokenIssuer};
