use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::address::NormalizedAddress;

/// Opaque identifier assigned to a building when it is first stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingId(pub Uuid);

impl BuildingId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A physical address resolved to a stable record.
///
/// Coordinates are captured once at creation and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub address_norm: NormalizedAddress,
    pub coordinates: Option<Coordinates>,
}

/// Accessibility determination exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessStatus {
    Yes,
    No,
    Unknown,
}

impl AccessStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AccessStatus::Yes => "YES",
            AccessStatus::No => "NO",
            AccessStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "YES" => Some(AccessStatus::Yes),
            "NO" => Some(AccessStatus::No),
            "UNKNOWN" => Some(AccessStatus::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The claim carried by a single user report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportedStatus {
    Yes,
    No,
}

impl ReportedStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReportedStatus::Yes => "YES",
            ReportedStatus::No => "NO",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "YES" => Some(ReportedStatus::Yes),
            "NO" => Some(ReportedStatus::No),
            _ => None,
        }
    }
}

impl fmt::Display for ReportedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current best-known determination for one building.
///
/// `votes_yes` and `votes_no` cache the report counts as of `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevatorStatus {
    pub building_id: BuildingId,
    pub status: AccessStatus,
    pub confidence: f64,
    pub votes_yes: u32,
    pub votes_no: u32,
    pub updated_at: DateTime<Utc>,
}

/// Append-only record of a submitted vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub building_id: BuildingId,
    pub status: ReportedStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload accepted by the report endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub address: String,
    pub status: ReportedStatus,
}

/// Response body of the check endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub status: AccessStatus,
    pub confidence: f64,
    pub normalized_address: NormalizedAddress,
}

impl StatusView {
    pub fn new(status: &ElevatorStatus, building: &Building) -> Self {
        Self {
            status: status.status,
            confidence: status.confidence,
            normalized_address: building.address_norm.clone(),
        }
    }
}
