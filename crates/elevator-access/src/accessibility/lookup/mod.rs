//! Outbound lookups against open map data.
//!
//! An empty result is a valid "no signal" outcome and is returned as `Ok`; only
//! transport, HTTP status and decoding problems become [`LookupError`].

mod nominatim;
mod overpass;

use async_trait::async_trait;

use super::domain::Coordinates;

pub use nominatim::NominatimGeocoder;
pub use overpass::OverpassFeatureLookup;

/// Address string to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, LookupError>;
}

/// Reports whether an accessibility-tagged map feature exists near a point.
#[async_trait]
pub trait FeatureLookup: Send + Sync {
    async fn has_accessibility_feature_nearby(
        &self,
        at: Coordinates,
        radius_meters: f64,
    ) -> Result<bool, LookupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("lookup service responded with {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unreadable lookup response: {0}")]
    Decode(String),
}

pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, LookupError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LookupError::Status {
        status,
        body: body.chars().take(200).collect(),
    })
}
