//! MapQuest geocoding v1 adapter for the [`Geocoder`] port.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::contract::model::GeoLocation;
use crate::domain::error::DomainError;
use crate::domain::ports::Geocoder;

pub struct MapquestGeocoder {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl MapquestGeocoder {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid geocoder base URL '{base_url}'"))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build geocoder HTTP client")?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    info: Option<Info>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct Info {
    #[serde(default)]
    statuscode: i64,
    #[serde(default)]
    messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    lat_lng: LatLng,
    #[serde(default)]
    street: String,
    /// City
    #[serde(default)]
    admin_area5: String,
    /// State
    #[serde(default)]
    admin_area3: String,
    #[serde(default)]
    postal_code: String,
    /// Country code
    #[serde(default)]
    admin_area1: String,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(s: String) -> Option<String> {
    let s = s.trim().to_string();
    (!s.is_empty()).then_some(s)
}

impl From<Location> for GeoLocation {
    fn from(loc: Location) -> Self {
        let mut out = GeoLocation::point(loc.lat_lng.lng, loc.lat_lng.lat);
        out.street = non_empty(loc.street);
        out.city = non_empty(loc.admin_area5);
        out.state = non_empty(loc.admin_area3);
        out.zipcode = non_empty(loc.postal_code);
        out.country = non_empty(loc.admin_area1);

        let parts: Vec<&str> = [&out.street, &out.city, &out.state, &out.zipcode, &out.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        out.formatted_address = (!parts.is_empty()).then(|| parts.join(", "));
        out
    }
}

#[async_trait]
impl Geocoder for MapquestGeocoder {
    #[instrument(
        name = "devcamper.http.geocoder.geocode",
        skip_all,
        fields(base_url = %self.base_url, address = %address)
    )]
    async fn geocode(&self, address: &str) -> Result<GeoLocation, DomainError> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("location", address);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::geocoder(e.to_string()))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "geocoder returned an error status");
            return Err(DomainError::geocoder(format!("HTTP {}", response.status())));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| DomainError::geocoder(format!("unreadable response: {e}")))?;

        if let Some(info) = &body.info {
            if info.statuscode != 0 {
                return Err(DomainError::geocoder(format!(
                    "status {}: {}",
                    info.statuscode,
                    info.messages.join("; ")
                )));
            }
        }

        let location = body
            .results
            .into_iter()
            .flat_map(|r| r.locations)
            .next()
            .ok_or_else(|| DomainError::AddressNotFound {
                address: address.to_string(),
            })?;

        let loc = GeoLocation::from(location);
        debug!(formatted = ?loc.formatted_address, "geocoded");
        Ok(loc)
    }
}
