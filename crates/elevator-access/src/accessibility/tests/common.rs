use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::accessibility::address::NormalizedAddress;
use crate::accessibility::confidence::Decision;
use crate::accessibility::domain::{
    Building, BuildingId, Coordinates, ElevatorStatus, Report, ReportedStatus,
};
use crate::accessibility::lookup::{FeatureLookup, Geocoder, LookupError};
use crate::accessibility::memory::InMemoryAccessibilityStore;
use crate::accessibility::repository::{AccessibilityStore, StoreError};
use crate::accessibility::{accessibility_router, AccessibilityService};

pub(super) const TEL_AVIV: Coordinates = Coordinates {
    lat: 32.0853,
    lng: 34.7818,
};

pub(super) type MemoryService =
    AccessibilityService<InMemoryAccessibilityStore, ScriptedGeocoder, ScriptedFeatures>;

pub(super) fn build_service(
    geocoder: ScriptedGeocoder,
    features: ScriptedFeatures,
) -> (
    MemoryService,
    Arc<InMemoryAccessibilityStore>,
    Arc<ScriptedGeocoder>,
    Arc<ScriptedFeatures>,
) {
    let store = Arc::new(InMemoryAccessibilityStore::default());
    let geocoder = Arc::new(geocoder);
    let features = Arc::new(features);
    let service = AccessibilityService::new(store.clone(), geocoder.clone(), features.clone());
    (service, store, geocoder, features)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    accessibility_router(Arc::new(service))
}

#[derive(Debug, Clone, Copy)]
enum Script<T> {
    Answer(T),
    Fail,
}

pub(super) struct ScriptedGeocoder {
    script: Script<Option<Coordinates>>,
    calls: AtomicUsize,
}

impl ScriptedGeocoder {
    pub(super) fn found(at: Coordinates) -> Self {
        Self::with(Script::Answer(Some(at)))
    }

    pub(super) fn no_match() -> Self {
        Self::with(Script::Answer(None))
    }

    pub(super) fn failing() -> Self {
        Self::with(Script::Fail)
    }

    fn with(script: Script<Option<Coordinates>>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinates>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Answer(found) => Ok(found),
            Script::Fail => Err(unreachable_service()),
        }
    }
}

pub(super) struct ScriptedFeatures {
    script: Script<bool>,
    calls: AtomicUsize,
    radii: Mutex<Vec<f64>>,
}

impl ScriptedFeatures {
    pub(super) fn present() -> Self {
        Self::with(Script::Answer(true))
    }

    pub(super) fn absent() -> Self {
        Self::with(Script::Answer(false))
    }

    pub(super) fn failing() -> Self {
        Self::with(Script::Fail)
    }

    fn with(script: Script<bool>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            radii: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn radii(&self) -> Vec<f64> {
        self.radii.lock().expect("radii mutex poisoned").clone()
    }
}

#[async_trait]
impl FeatureLookup for ScriptedFeatures {
    async fn has_accessibility_feature_nearby(
        &self,
        _at: Coordinates,
        radius_meters: f64,
    ) -> Result<bool, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.radii
            .lock()
            .expect("radii mutex poisoned")
            .push(radius_meters);
        match self.script {
            Script::Answer(found) => Ok(found),
            Script::Fail => Err(unreachable_service()),
        }
    }
}

fn unreachable_service() -> LookupError {
    LookupError::Status {
        status: reqwest::StatusCode::BAD_GATEWAY,
        body: "upstream unavailable".to_string(),
    }
}

/// Store whose every call fails, as if the database were offline.
pub(super) struct UnavailableStore;

fn offline() -> StoreError {
    StoreError::Unavailable("database offline".to_string())
}

#[async_trait]
impl AccessibilityStore for UnavailableStore {
    async fn find_building(
        &self,
        _address: &NormalizedAddress,
    ) -> Result<Option<Building>, StoreError> {
        Err(offline())
    }

    async fn create_building(
        &self,
        _address: &NormalizedAddress,
        _coordinates: Option<Coordinates>,
    ) -> Result<Building, StoreError> {
        Err(offline())
    }

    async fn find_status(
        &self,
        _building_id: BuildingId,
    ) -> Result<Option<ElevatorStatus>, StoreError> {
        Err(offline())
    }

    async fn create_status(
        &self,
        _building_id: BuildingId,
        _decision: Decision,
    ) -> Result<ElevatorStatus, StoreError> {
        Err(offline())
    }

    async fn update_status(&self, _status: &ElevatorStatus) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn insert_report(
        &self,
        _building_id: BuildingId,
        _status: ReportedStatus,
    ) -> Result<Report, StoreError> {
        Err(offline())
    }

    async fn count_reports(
        &self,
        _building_id: BuildingId,
        _status: ReportedStatus,
    ) -> Result<u32, StoreError> {
        Err(offline())
    }
}

/// Store that loses every create race: a competing writer inserts the row first and
/// this caller sees a uniqueness conflict. With `phantom_conflict` the competing
/// building row is never visible, so the conflict cannot be resolved by re-reading.
#[derive(Default)]
pub(super) struct RacingStore {
    pub(super) inner: InMemoryAccessibilityStore,
    pub(super) phantom_conflict: bool,
}

#[async_trait]
impl AccessibilityStore for RacingStore {
    async fn find_building(
        &self,
        address: &NormalizedAddress,
    ) -> Result<Option<Building>, StoreError> {
        self.inner.find_building(address).await
    }

    async fn create_building(
        &self,
        address: &NormalizedAddress,
        coordinates: Option<Coordinates>,
    ) -> Result<Building, StoreError> {
        if !self.phantom_conflict {
            self.inner.create_building(address, coordinates).await?;
        }
        Err(StoreError::Conflict)
    }

    async fn find_status(
        &self,
        building_id: BuildingId,
    ) -> Result<Option<ElevatorStatus>, StoreError> {
        self.inner.find_status(building_id).await
    }

    async fn create_status(
        &self,
        building_id: BuildingId,
        decision: Decision,
    ) -> Result<ElevatorStatus, StoreError> {
        self.inner.create_status(building_id, decision).await?;
        Err(StoreError::Conflict)
    }

    async fn update_status(&self, status: &ElevatorStatus) -> Result<(), StoreError> {
        self.inner.update_status(status).await
    }

    async fn insert_report(
        &self,
        building_id: BuildingId,
        status: ReportedStatus,
    ) -> Result<Report, StoreError> {
        self.inner.insert_report(building_id, status).await
    }

    async fn count_reports(
        &self,
        building_id: BuildingId,
        status: ReportedStatus,
    ) -> Result<u32, StoreError> {
        self.inner.count_reports(building_id, status).await
    }
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
