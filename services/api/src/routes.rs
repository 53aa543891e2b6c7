use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Extension;
use axum::Json;
use elevator_access::accessibility::{
    accessibility_router, AccessibilityService, AccessibilityStore, FeatureLookup, Geocoder,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_accessibility_routes<S, G, F>(
    service: Arc<AccessibilityService<S, G, F>>,
) -> axum::Router
where
    S: AccessibilityStore + 'static,
    G: Geocoder + 'static,
    F: FeatureLookup + 'static,
{
    accessibility_router(service)
        .route("/api/hello", get(hello_endpoint))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn hello_endpoint() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
