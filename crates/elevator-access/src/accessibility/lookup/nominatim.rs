use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{ensure_success, Geocoder, LookupError};
use crate::accessibility::domain::Coordinates;

/// Geocoder backed by a Nominatim search endpoint.
pub struct NominatimGeocoder {
    http: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(
        endpoint: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, LookupError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", address),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let hits: Vec<SearchHit> = ensure_success(response).await?.json().await?;
        hits.first().map(parse_hit).transpose()
    }
}

fn parse_hit(hit: &SearchHit) -> Result<Coordinates, LookupError> {
    let lat = hit
        .lat
        .trim()
        .parse::<f64>()
        .map_err(|_| LookupError::Decode(format!("latitude '{}' is not a number", hit.lat)))?;
    let lng = hit
        .lon
        .trim()
        .parse::<f64>()
        .map_err(|_| LookupError::Decode(format!("longitude '{}' is not a number", hit.lon)))?;
    Ok(Coordinates { lat, lng })
}
