//! End-to-end scenarios for the check and report endpoints.
//!
//! Requests go through the public router backed by the in-memory store, with scripted
//! lookups standing in for the geocoder and the map-feature service.

mod common {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::response::Response;
    use serde_json::Value;

    use elevator_access::accessibility::{
        accessibility_router, AccessibilityService, Coordinates, FeatureLookup, Geocoder,
        InMemoryAccessibilityStore, LookupError,
    };

    pub(super) struct FixedGeocoder(pub(super) Option<Coordinates>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, _address: &str) -> Result<Option<Coordinates>, LookupError> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    pub(super) struct CountingFeatures {
        pub(super) present: bool,
        calls: AtomicUsize,
    }

    impl CountingFeatures {
        pub(super) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FeatureLookup for CountingFeatures {
        async fn has_accessibility_feature_nearby(
            &self,
            _at: Coordinates,
            _radius_meters: f64,
        ) -> Result<bool, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.present)
        }
    }

    pub(super) struct Harness {
        pub(super) router: axum::Router,
        pub(super) store: Arc<InMemoryAccessibilityStore>,
        pub(super) features: Arc<CountingFeatures>,
    }

    pub(super) fn harness(coordinates: Option<Coordinates>, feature_present: bool) -> Harness {
        let store = Arc::new(InMemoryAccessibilityStore::default());
        let features = Arc::new(CountingFeatures {
            present: feature_present,
            ..CountingFeatures::default()
        });
        let service = AccessibilityService::new(
            store.clone(),
            Arc::new(FixedGeocoder(coordinates)),
            features.clone(),
        );
        Harness {
            router: accessibility_router(Arc::new(service)),
            store,
            features,
        }
    }

    /// `query` is the already percent-encoded value of the `address` parameter.
    pub(super) fn check(query: &str) -> Request<Body> {
        Request::get(format!("/api/check?address={query}"))
            .body(Body::empty())
            .expect("request builds")
    }

    pub(super) fn report(address: &str, status: &str) -> Request<Body> {
        let payload = serde_json::json!({ "address": address, "status": status });
        Request::post("/api/report")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds")
    }

    pub(super) async fn json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    pub(super) fn assert_confidence(payload: &Value, expected: f64) {
        let actual = payload["confidence"].as_f64().expect("numeric confidence");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected confidence {expected}, got {actual}"
        );
    }
}

use axum::http::StatusCode;
use common::*;
use elevator_access::accessibility::Coordinates;
use serde_json::json;
use tower::ServiceExt;

// "  רח׳ יפו  97 "
const JAFFA_ST_ABBREVIATED: &str = "%20%20%D7%A8%D7%97%D7%B3%20%D7%99%D7%A4%D7%95%20%2097%20";

const JERUSALEM: Coordinates = Coordinates {
    lat: 31.7767,
    lng: 35.2345,
};

#[tokio::test]
async fn first_query_seeds_status_from_map_data() {
    let harness = harness(Some(JERUSALEM), true);

    let response = harness
        .router
        .oneshot(check(JAFFA_ST_ABBREVIATED))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["status"], "YES");
    assert_confidence(&payload, 0.8);
    assert_eq!(payload["normalized_address"], "רחוב יפו 97");
    assert_eq!(harness.store.building_count(), 1);
    assert_eq!(harness.store.status_count(), 1);
}

#[tokio::test]
async fn repeated_query_is_idempotent() {
    let harness = harness(Some(JERUSALEM), true);

    let first = harness
        .router
        .clone()
        .oneshot(check("Jaffa%2097"))
        .await
        .expect("route executes");
    let first = json_body(first).await;

    let second = harness
        .router
        .oneshot(check("Jaffa%2097"))
        .await
        .expect("route executes");
    let second = json_body(second).await;

    assert_eq!(first, second);
    assert_eq!(harness.store.building_count(), 1);
    assert_eq!(harness.store.status_count(), 1);
    assert_eq!(harness.features.calls(), 1);
}

#[tokio::test]
async fn mixed_reports_fall_into_middle_band() {
    let harness = harness(None, false);
    harness
        .router
        .clone()
        .oneshot(check("Jaffa%2097"))
        .await
        .expect("building registered");

    for claim in ["YES", "YES", "NO"] {
        let response = harness
            .router
            .clone()
            .oneshot(report("Jaffa 97", claim))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "ok": true }));
    }

    let response = harness
        .router
        .oneshot(check("Jaffa%2097"))
        .await
        .expect("route executes");
    let payload = json_body(response).await;
    assert_eq!(payload["status"], "UNKNOWN");
    assert_confidence(&payload, 0.4);
}

#[tokio::test]
async fn report_for_unknown_address_fails_without_writes() {
    let harness = harness(Some(JERUSALEM), true);

    let response = harness
        .router
        .oneshot(report("King George 1", "YES"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    assert_eq!(payload["ok"], false);
    assert_eq!(harness.store.building_count(), 0);
    assert_eq!(harness.store.status_count(), 0);
    assert_eq!(harness.store.report_count(), 0);
}

#[tokio::test]
async fn votes_replace_map_seeded_status() {
    let harness = harness(Some(JERUSALEM), true);
    let seeded = harness
        .router
        .clone()
        .oneshot(check("Jaffa%2097"))
        .await
        .expect("route executes");
    assert_eq!(json_body(seeded).await["status"], "YES");

    // Recomputation ignores map data, so votes alone decide from here on.
    for claim in ["YES", "YES", "YES", "NO"] {
        harness
            .router
            .clone()
            .oneshot(report("Jaffa 97", claim))
            .await
            .expect("route executes");
    }

    let response = harness
        .router
        .oneshot(check("Jaffa%2097"))
        .await
        .expect("route executes");
    let payload = json_body(response).await;
    assert_eq!(payload["status"], "YES");
    assert_confidence(&payload, 0.9);
    assert_eq!(harness.store.report_count(), 4);
    assert_eq!(harness.features.calls(), 1);
}
