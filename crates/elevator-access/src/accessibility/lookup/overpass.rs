use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

use super::{ensure_success, FeatureLookup, LookupError};
use crate::accessibility::domain::Coordinates;

/// Feature lookup backed by an Overpass API interpreter.
///
/// Matches nodes tagged `wheelchair=yes` or `elevator=yes` and ways tagged
/// `elevator=yes` within the radius.
pub struct OverpassFeatureLookup {
    http: Client,
    endpoint: String,
    query_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<serde_json::Value>,
}

impl OverpassFeatureLookup {
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
            query_timeout_secs: timeout.as_secs().max(1),
        })
    }
}

pub(crate) fn build_query(at: Coordinates, radius_meters: f64, timeout_secs: u64) -> String {
    let Coordinates { lat, lng } = at;
    format!(
        "[out:json][timeout:{timeout_secs}];\n\
         (\n  \
         node(around:{radius_meters}, {lat}, {lng})[\"wheelchair\"=\"yes\"];\n  \
         node(around:{radius_meters}, {lat}, {lng})[\"elevator\"=\"yes\"];\n  \
         way(around:{radius_meters}, {lat}, {lng})[\"elevator\"=\"yes\"];\n\
         );\n\
         out body; >; out skel qt;"
    )
}

#[async_trait]
impl FeatureLookup for OverpassFeatureLookup {
    async fn has_accessibility_feature_nearby(
        &self,
        at: Coordinates,
        radius_meters: f64,
    ) -> Result<bool, LookupError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/plain")
            .body(build_query(at, radius_meters, self.query_timeout_secs))
            .send()
            .await?;

        let payload: OverpassResponse = ensure_success(response).await?.json().await?;
        Ok(!payload.elements.is_empty())
    }
}
