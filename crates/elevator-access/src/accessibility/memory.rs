use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::address::NormalizedAddress;
use super::confidence::Decision;
use super::domain::{Building, BuildingId, Coordinates, ElevatorStatus, Report, ReportedStatus};
use super::repository::{AccessibilityStore, StoreError};

#[derive(Debug, Default)]
struct MemoryTables {
    buildings: HashMap<NormalizedAddress, Building>,
    statuses: HashMap<BuildingId, ElevatorStatus>,
    reports: Vec<Report>,
}

/// Process-local store used for local runs and tests.
///
/// Cloned handles share the same tables.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAccessibilityStore {
    tables: Arc<Mutex<MemoryTables>>,
}

impl InMemoryAccessibilityStore {
    fn tables(&self) -> Result<MutexGuard<'_, MemoryTables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    pub fn building_count(&self) -> usize {
        self.tables().map(|tables| tables.buildings.len()).unwrap_or(0)
    }

    pub fn status_count(&self) -> usize {
        self.tables().map(|tables| tables.statuses.len()).unwrap_or(0)
    }

    pub fn report_count(&self) -> usize {
        self.tables().map(|tables| tables.reports.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AccessibilityStore for InMemoryAccessibilityStore {
    async fn find_building(
        &self,
        address: &NormalizedAddress,
    ) -> Result<Option<Building>, StoreError> {
        Ok(self.tables()?.buildings.get(address).cloned())
    }

    async fn create_building(
        &self,
        address: &NormalizedAddress,
        coordinates: Option<Coordinates>,
    ) -> Result<Building, StoreError> {
        let mut tables = self.tables()?;
        if tables.buildings.contains_key(address) {
            return Err(StoreError::Conflict);
        }
        let building = Building {
            id: BuildingId::generate(),
            address_norm: address.clone(),
            coordinates,
        };
        tables.buildings.insert(address.clone(), building.clone());
        Ok(building)
    }

    async fn find_status(
        &self,
        building_id: BuildingId,
    ) -> Result<Option<ElevatorStatus>, StoreError> {
        Ok(self.tables()?.statuses.get(&building_id).cloned())
    }

    async fn create_status(
        &self,
        building_id: BuildingId,
        decision: Decision,
    ) -> Result<ElevatorStatus, StoreError> {
        let mut tables = self.tables()?;
        if !tables.buildings.values().any(|b| b.id == building_id) {
            return Err(StoreError::NotFound);
        }
        if tables.statuses.contains_key(&building_id) {
            return Err(StoreError::Conflict);
        }
        let status = ElevatorStatus {
            building_id,
            status: decision.status,
            confidence: decision.confidence,
            votes_yes: 0,
            votes_no: 0,
            updated_at: Utc::now(),
        };
        tables.statuses.insert(building_id, status.clone());
        Ok(status)
    }

    async fn update_status(&self, status: &ElevatorStatus) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        match tables.statuses.get_mut(&status.building_id) {
            Some(existing) => {
                *existing = status.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn insert_report(
        &self,
        building_id: BuildingId,
        status: ReportedStatus,
    ) -> Result<Report, StoreError> {
        let mut tables = self.tables()?;
        if !tables.buildings.values().any(|b| b.id == building_id) {
            return Err(StoreError::NotFound);
        }
        let report = Report {
            building_id,
            status,
            created_at: Utc::now(),
        };
        tables.reports.push(report.clone());
        Ok(report)
    }

    async fn count_reports(
        &self,
        building_id: BuildingId,
        status: ReportedStatus,
    ) -> Result<u32, StoreError> {
        let tables = self.tables()?;
        let count = tables
            .reports
            .iter()
            .filter(|report| report.building_id == building_id && report.status == status)
            .count();
        u32::try_from(count)
            .map_err(|_| StoreError::Unavailable("report count overflow".to_string()))
    }
}
