use async_trait::async_trait;

use crate::contract::model::GeoLocation;
use crate::domain::error::DomainError;

/// Resolves free-form addresses (or zip codes) to a point.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// First match for `address`. No match is
    /// [`DomainError::AddressNotFound`].
    async fn geocode(&self, address: &str) -> Result<GeoLocation, DomainError>;
}
