use async_trait::async_trait;
use elevator_access::accessibility::{
    AccessibilityService, AccessibilityStore, Building, BuildingId, Coordinates, Decision,
    ElevatorStatus, InMemoryAccessibilityStore, NominatimGeocoder, NormalizedAddress,
    OverpassFeatureLookup, PgAccessibilityStore, Report, ReportedStatus, StoreError,
};
use elevator_access::config::AppConfig;
use elevator_access::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type AppService =
    AccessibilityService<AppStore, NominatimGeocoder, OverpassFeatureLookup>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store chosen at startup: PostgreSQL when a database URL is configured.
pub(crate) enum AppStore {
    Memory(InMemoryAccessibilityStore),
    Postgres(PgAccessibilityStore),
}

impl AppStore {
    pub(crate) async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        match &config.storage.database_url {
            Some(url) => {
                let store = PgAccessibilityStore::connect(url).await?;
                info!("using postgres store");
                Ok(Self::Postgres(store))
            }
            None => {
                info!("DATABASE_URL not set; using in-memory store");
                Ok(Self::Memory(InMemoryAccessibilityStore::default()))
            }
        }
    }
}

#[async_trait]
impl AccessibilityStore for AppStore {
    async fn find_building(
        &self,
        address: &NormalizedAddress,
    ) -> Result<Option<Building>, StoreError> {
        match self {
            Self::Memory(store) => store.find_building(address).await,
            Self::Postgres(store) => store.find_building(address).await,
        }
    }

    async fn create_building(
        &self,
        address: &NormalizedAddress,
        coordinates: Option<Coordinates>,
    ) -> Result<Building, StoreError> {
        match self {
            Self::Memory(store) => store.create_building(address, coordinates).await,
            Self::Postgres(store) => store.create_building(address, coordinates).await,
        }
    }

    async fn find_status(
        &self,
        building_id: BuildingId,
    ) -> Result<Option<ElevatorStatus>, StoreError> {
        match self {
            Self::Memory(store) => store.find_status(building_id).await,
            Self::Postgres(store) => store.find_status(building_id).await,
        }
    }

    async fn create_status(
        &self,
        building_id: BuildingId,
        decision: Decision,
    ) -> Result<ElevatorStatus, StoreError> {
        match self {
            Self::Memory(store) => store.create_status(building_id, decision).await,
            Self::Postgres(store) => store.create_status(building_id, decision).await,
        }
    }

    async fn update_status(&self, status: &ElevatorStatus) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.update_status(status).await,
            Self::Postgres(store) => store.update_status(status).await,
        }
    }

    async fn insert_report(
        &self,
        building_id: BuildingId,
        status: ReportedStatus,
    ) -> Result<Report, StoreError> {
        match self {
            Self::Memory(store) => store.insert_report(building_id, status).await,
            Self::Postgres(store) => store.insert_report(building_id, status).await,
        }
    }

    async fn count_reports(
        &self,
        building_id: BuildingId,
        status: ReportedStatus,
    ) -> Result<u32, StoreError> {
        match self {
            Self::Memory(store) => store.count_reports(building_id, status).await,
            Self::Postgres(store) => store.count_reports(building_id, status).await,
        }
    }
}

/// Wire the configured store and lookup clients into the accessibility service.
pub(crate) async fn build_service(config: &AppConfig) -> Result<AppService, AppError> {
    let lookup = &config.lookup;
    let geocoder =
        NominatimGeocoder::new(lookup.geocoder_url.clone(), &lookup.user_agent, lookup.timeout)?;
    let features =
        OverpassFeatureLookup::new(lookup.overpass_url.clone(), &lookup.user_agent, lookup.timeout)?;
    let store = AppStore::from_config(config).await?;

    Ok(
        AccessibilityService::new(Arc::new(store), Arc::new(geocoder), Arc::new(features))
            .with_feature_radius(lookup.feature_radius_meters),
    )
}
