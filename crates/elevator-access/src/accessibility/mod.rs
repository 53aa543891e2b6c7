//! Building lookup, status resolution, and crowd report ingestion.
//!
//! Decision logic lives in [`address`] and [`confidence`] as pure functions; the
//! [`service`] orchestrates find-or-create flows over the store and lookup traits.

pub mod address;
pub mod confidence;
pub mod domain;
pub mod lookup;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use address::{normalize_address, AddressError, NormalizedAddress};
pub use confidence::{decide, Decision};
pub use domain::{
    AccessStatus, Building, BuildingId, Coordinates, ElevatorStatus, Report, ReportSubmission,
    ReportedStatus, StatusView,
};
pub use lookup::{FeatureLookup, Geocoder, LookupError, NominatimGeocoder, OverpassFeatureLookup};
pub use memory::InMemoryAccessibilityStore;
pub use postgres::PgAccessibilityStore;
pub use repository::{AccessibilityStore, StoreError};
pub use router::accessibility_router;
pub use service::{AccessibilityService, AccessibilityServiceError, DEFAULT_FEATURE_RADIUS_METERS};
