use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{ReportSubmission, StatusView};
use super::lookup::{FeatureLookup, Geocoder};
use super::repository::AccessibilityStore;
use super::service::{AccessibilityService, AccessibilityServiceError};
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CheckParams {
    #[serde(default)]
    pub(crate) address: Option<String>,
}

/// Router exposing the check (read) and report (write) endpoints.
///
/// Non-POST requests to the report endpoint are answered with 405 by the method router.
pub fn accessibility_router<S, G, F>(service: Arc<AccessibilityService<S, G, F>>) -> Router
where
    S: AccessibilityStore + 'static,
    G: Geocoder + 'static,
    F: FeatureLookup + 'static,
{
    Router::new()
        .route("/api/check", get(check_handler::<S, G, F>))
        .route("/api/report", post(report_handler::<S, G, F>))
        .with_state(service)
}

pub(crate) async fn check_handler<S, G, F>(
    State(service): State<Arc<AccessibilityService<S, G, F>>>,
    params: Result<Query<CheckParams>, QueryRejection>,
) -> Result<Json<StatusView>, AppError>
where
    S: AccessibilityStore + 'static,
    G: Geocoder + 'static,
    F: FeatureLookup + 'static,
{
    let Query(params) = params?;
    let raw = params.address.unwrap_or_default();
    match service.check(&raw).await {
        Ok(view) => Ok(Json(view)),
        Err(err @ AccessibilityServiceError::InvalidAddress(_)) => Err(err.into()),
        Err(other) => {
            error!(error = %other, "check request failed");
            Err(other.into())
        }
    }
}

pub(crate) async fn report_handler<S, G, F>(
    State(service): State<Arc<AccessibilityService<S, G, F>>>,
    payload: Result<Json<ReportSubmission>, JsonRejection>,
) -> Response
where
    S: AccessibilityStore + 'static,
    G: Geocoder + 'static,
    F: FeatureLookup + 'static,
{
    let submission = match payload {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            let payload = json!({ "ok": false, "error": rejection.body_text() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match service
        .submit_report(&submission.address, submission.status)
        .await
    {
        Ok(_) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(AccessibilityServiceError::InvalidAddress(err)) => {
            let payload = json!({ "ok": false, "error": err.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(AccessibilityServiceError::BuildingNotFound(_)) => {
            let payload = json!({ "ok": false, "error": "building not found" });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(other) => {
            error!(error = %other, "report submission failed");
            let payload = json!({ "ok": false, "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
