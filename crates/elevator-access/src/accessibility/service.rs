use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::address::{AddressError, NormalizedAddress};
use super::confidence::{decide, Decision};
use super::domain::{Building, ElevatorStatus, ReportedStatus, StatusView};
use super::lookup::{FeatureLookup, Geocoder};
use super::repository::{AccessibilityStore, StoreError};

/// Default search radius, in meters, for the map-feature lookup.
pub const DEFAULT_FEATURE_RADIUS_METERS: f64 = 25.0;

/// Service composing the store with the geocode and map-feature lookups.
///
/// Holds no mutable state of its own; every request reads and writes through the store.
pub struct AccessibilityService<S, G, F> {
    store: Arc<S>,
    geocoder: Arc<G>,
    features: Arc<F>,
    feature_radius_meters: f64,
}

impl<S, G, F> AccessibilityService<S, G, F>
where
    S: AccessibilityStore + 'static,
    G: Geocoder + 'static,
    F: FeatureLookup + 'static,
{
    pub fn new(store: Arc<S>, geocoder: Arc<G>, features: Arc<F>) -> Self {
        Self {
            store,
            geocoder,
            features,
            feature_radius_meters: DEFAULT_FEATURE_RADIUS_METERS,
        }
    }

    pub fn with_feature_radius(mut self, radius_meters: f64) -> Self {
        self.feature_radius_meters = radius_meters;
        self
    }

    /// Read path: resolve the building and its status for a raw address.
    pub async fn check(&self, raw_address: &str) -> Result<StatusView, AccessibilityServiceError> {
        let building = self.resolve_building(raw_address).await?;
        let status = self.resolve_status(&building).await?;
        Ok(StatusView::new(&status, &building))
    }

    /// Find the building for an address, creating and geocoding it on first sight.
    pub async fn resolve_building(
        &self,
        raw_address: &str,
    ) -> Result<Building, AccessibilityServiceError> {
        let address = NormalizedAddress::parse(raw_address)?;

        if let Some(building) = self.store.find_building(&address).await? {
            return Ok(building);
        }

        let coordinates = match self.geocoder.geocode(address.as_str()).await {
            Ok(found) => found,
            Err(err) => {
                warn!(address = %address, error = %err, "geocode failed; storing building without coordinates");
                None
            }
        };

        match self.store.create_building(&address, coordinates).await {
            Ok(building) => {
                info!(
                    address = %building.address_norm,
                    building_id = %building.id,
                    geocoded = building.coordinates.is_some(),
                    "building created"
                );
                Ok(building)
            }
            Err(StoreError::Conflict) => {
                debug!(address = %address, "building created concurrently; re-reading");
                self.store
                    .find_building(&address)
                    .await?
                    .ok_or(AccessibilityServiceError::Store(StoreError::Conflict))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Find the status row for a building, seeding it from the map-feature signal when
    /// absent. Existing reports are never consulted here.
    pub async fn resolve_status(
        &self,
        building: &Building,
    ) -> Result<ElevatorStatus, AccessibilityServiceError> {
        if let Some(status) = self.store.find_status(building.id).await? {
            return Ok(status);
        }

        let external_signal = match building.coordinates {
            Some(at) => match self
                .features
                .has_accessibility_feature_nearby(at, self.feature_radius_meters)
                .await
            {
                Ok(found) => found,
                Err(err) => {
                    warn!(building_id = %building.id, error = %err, "feature lookup failed; treating as no signal");
                    false
                }
            },
            None => false,
        };

        let decision = decide(0, 0, external_signal);
        let status = self.create_status_or_reread(building, decision).await?;
        info!(
            building_id = %building.id,
            status = %status.status,
            confidence = status.confidence,
            external_signal,
            "elevator status seeded"
        );
        Ok(status)
    }

    /// Write path: record a vote and recompute the status from all stored reports.
    ///
    /// Recomputation always passes `external_signal = false`, so the first report
    /// replaces a status that was seeded from map data.
    pub async fn submit_report(
        &self,
        raw_address: &str,
        claimed: ReportedStatus,
    ) -> Result<ElevatorStatus, AccessibilityServiceError> {
        let address = NormalizedAddress::parse(raw_address)?;
        let building = self
            .store
            .find_building(&address)
            .await?
            .ok_or_else(|| AccessibilityServiceError::BuildingNotFound(address.clone()))?;

        let mut status = match self.store.find_status(building.id).await? {
            Some(status) => status,
            None => {
                self.create_status_or_reread(&building, Decision::unknown())
                    .await?
            }
        };

        self.store.insert_report(building.id, claimed).await?;

        let votes_yes = self
            .store
            .count_reports(building.id, ReportedStatus::Yes)
            .await?;
        let votes_no = self
            .store
            .count_reports(building.id, ReportedStatus::No)
            .await?;

        let decision = decide(votes_yes, votes_no, false);
        status.status = decision.status;
        status.confidence = decision.confidence;
        status.votes_yes = votes_yes;
        status.votes_no = votes_no;
        status.updated_at = Utc::now();

        self.store.update_status(&status).await?;
        info!(
            building_id = %building.id,
            claimed = %claimed,
            votes_yes,
            votes_no,
            status = %status.status,
            confidence = status.confidence,
            "report recorded"
        );
        Ok(status)
    }

    async fn create_status_or_reread(
        &self,
        building: &Building,
        decision: Decision,
    ) -> Result<ElevatorStatus, AccessibilityServiceError> {
        match self.store.create_status(building.id, decision).await {
            Ok(status) => Ok(status),
            Err(StoreError::Conflict) => {
                debug!(building_id = %building.id, "status created concurrently; re-reading");
                self.store
                    .find_status(building.id)
                    .await?
                    .ok_or(AccessibilityServiceError::Store(StoreError::Conflict))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Error raised by the accessibility service.
#[derive(Debug, thiserror::Error)]
pub enum AccessibilityServiceError {
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),
    #[error("building not found for address '{0}'")]
    BuildingNotFound(NormalizedAddress),
    #[error(transparent)]
    Store(#[from] StoreError),
}
