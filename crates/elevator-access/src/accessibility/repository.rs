use async_trait::async_trait;

use super::address::NormalizedAddress;
use super::confidence::Decision;
use super::domain::{Building, BuildingId, Coordinates, ElevatorStatus, Report, ReportedStatus};

/// Storage abstraction so the resolvers can be exercised without a database.
///
/// Implementations enforce one building per normalized address and one status row per
/// building, reporting violations as [`StoreError::Conflict`].
#[async_trait]
pub trait AccessibilityStore: Send + Sync {
    async fn find_building(
        &self,
        address: &NormalizedAddress,
    ) -> Result<Option<Building>, StoreError>;

    async fn create_building(
        &self,
        address: &NormalizedAddress,
        coordinates: Option<Coordinates>,
    ) -> Result<Building, StoreError>;

    async fn find_status(&self, building_id: BuildingId)
        -> Result<Option<ElevatorStatus>, StoreError>;

    /// Insert the first status row for a building with zero vote counts.
    async fn create_status(
        &self,
        building_id: BuildingId,
        decision: Decision,
    ) -> Result<ElevatorStatus, StoreError>;

    async fn update_status(&self, status: &ElevatorStatus) -> Result<(), StoreError>;

    async fn insert_report(
        &self,
        building_id: BuildingId,
        status: ReportedStatus,
    ) -> Result<Report, StoreError>;

    async fn count_reports(
        &self,
        building_id: BuildingId,
        status: ReportedStatus,
    ) -> Result<u32, StoreError>;
}

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
