//! PostgreSQL-backed store.
//!
//! Uniqueness of `buildings.address_norm` and `elevator_status.building_id` is enforced
//! by the schema; unique violations surface as [`StoreError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use super::address::NormalizedAddress;
use super::confidence::Decision;
use super::domain::{
    AccessStatus, Building, BuildingId, Coordinates, ElevatorStatus, Report, ReportedStatus,
};
use super::repository::{AccessibilityStore, StoreError};

pub struct PgAccessibilityStore {
    pool: PgPool,
}

impl PgAccessibilityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url` and apply pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self::new(pool))
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StoreError::NotFound;
        }
    }

    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Database(other),
    }
}

fn building_from_row(row: &PgRow) -> Result<Building, StoreError> {
    let id: Uuid = row.try_get("id").map_err(map_sqlx_error)?;
    let address: String = row.try_get("address_norm").map_err(map_sqlx_error)?;
    let lat: Option<f64> = row.try_get("lat").map_err(map_sqlx_error)?;
    let lng: Option<f64> = row.try_get("lng").map_err(map_sqlx_error)?;

    Ok(Building {
        id: BuildingId(id),
        address_norm: NormalizedAddress::from_stored(address),
        coordinates: lat.zip(lng).map(|(lat, lng)| Coordinates { lat, lng }),
    })
}

fn status_from_row(row: &PgRow) -> Result<ElevatorStatus, StoreError> {
    let building_id: Uuid = row.try_get("building_id").map_err(map_sqlx_error)?;
    let label: String = row.try_get("status").map_err(map_sqlx_error)?;
    let confidence: f64 = row.try_get("confidence").map_err(map_sqlx_error)?;
    let votes_yes: i32 = row.try_get("votes_yes").map_err(map_sqlx_error)?;
    let votes_no: i32 = row.try_get("votes_no").map_err(map_sqlx_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(map_sqlx_error)?;

    let status = AccessStatus::from_label(&label)
        .ok_or_else(|| StoreError::Unavailable(format!("unexpected status '{label}'")))?;

    Ok(ElevatorStatus {
        building_id: BuildingId(building_id),
        status,
        confidence,
        votes_yes: vote_count(votes_yes)?,
        votes_no: vote_count(votes_no)?,
        updated_at,
    })
}

fn vote_count(value: i32) -> Result<u32, StoreError> {
    u32::try_from(value)
        .map_err(|_| StoreError::Unavailable(format!("negative vote count {value}")))
}

fn vote_column(value: u32) -> Result<i32, StoreError> {
    i32::try_from(value)
        .map_err(|_| StoreError::Unavailable(format!("vote count {value} exceeds column range")))
}

#[async_trait]
impl AccessibilityStore for PgAccessibilityStore {
    async fn find_building(
        &self,
        address: &NormalizedAddress,
    ) -> Result<Option<Building>, StoreError> {
        let row =
            sqlx::query("SELECT id, address_norm, lat, lng FROM buildings WHERE address_norm = $1")
                .bind(address.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.as_ref().map(building_from_row).transpose()
    }

    async fn create_building(
        &self,
        address: &NormalizedAddress,
        coordinates: Option<Coordinates>,
    ) -> Result<Building, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO buildings (id, address_norm, lat, lng)
            VALUES ($1, $2, $3, $4)
            RETURNING id, address_norm, lat, lng
            "#,
        )
        .bind(BuildingId::generate().0)
        .bind(address.as_str())
        .bind(coordinates.map(|c| c.lat))
        .bind(coordinates.map(|c| c.lng))
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        building_from_row(&row)
    }

    async fn find_status(
        &self,
        building_id: BuildingId,
    ) -> Result<Option<ElevatorStatus>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT building_id, status, confidence, votes_yes, votes_no, updated_at
            FROM elevator_status
            WHERE building_id = $1
            "#,
        )
        .bind(building_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(status_from_row).transpose()
    }

    async fn create_status(
        &self,
        building_id: BuildingId,
        decision: Decision,
    ) -> Result<ElevatorStatus, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO elevator_status (building_id, status, confidence, votes_yes, votes_no, updated_at)
            VALUES ($1, $2, $3, 0, 0, now())
            RETURNING building_id, status, confidence, votes_yes, votes_no, updated_at
            "#,
        )
        .bind(building_id.0)
        .bind(decision.status.label())
        .bind(decision.confidence)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        status_from_row(&row)
    }

    async fn update_status(&self, status: &ElevatorStatus) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE elevator_status
            SET status = $2, confidence = $3, votes_yes = $4, votes_no = $5, updated_at = $6
            WHERE building_id = $1
            "#,
        )
        .bind(status.building_id.0)
        .bind(status.status.label())
        .bind(status.confidence)
        .bind(vote_column(status.votes_yes)?)
        .bind(vote_column(status.votes_no)?)
        .bind(status.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn insert_report(
        &self,
        building_id: BuildingId,
        status: ReportedStatus,
    ) -> Result<Report, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO reports (building_id, status)
            VALUES ($1, $2)
            RETURNING created_at
            "#,
        )
        .bind(building_id.0)
        .bind(status.label())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(map_sqlx_error)?;
        Ok(Report {
            building_id,
            status,
            created_at,
        })
    }

    async fn count_reports(
        &self,
        building_id: BuildingId,
        status: ReportedStatus,
    ) -> Result<u32, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reports WHERE building_id = $1 AND status = $2",
        )
        .bind(building_id.0)
        .bind(status.label())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        u32::try_from(count)
            .map_err(|_| StoreError::Unavailable(format!("report count {count} out of range")))
    }
}
