use crate::domain::geofence::GeofenceConstraint;
use crate::domain::scan::PayeeIdentifier;
use crate::service::credential_service::FenceRequest;
use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub raw: String,
}

#[derive(Debug, Deserialize)]
pub struct IssueCredentialRequest {
    pub raw: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_m: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct IssueCredentialResponse {
    pub payee: PayeeIdentifier,
    pub fence: GeofenceConstraint,
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub payload: String,
}

pub async fn scan(State(state): State<AppState>, Json(req): Json<ScanRequest>) -> impl IntoResponse {
    match state.credential_service.scan(&req.raw) {
        Ok(details) => (axum::http::StatusCode::OK, Json(details)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn issue_credential(
    State(state): State<AppState>,
    Json(req): Json<IssueCredentialRequest>,
) -> impl IntoResponse {
    let fence = FenceRequest {
        lat: req.lat,
        lon: req.lon,
        radius_m: req.radius_m,
    };
    let result = state
        .credential_service
        .issue_from_scan(&req.raw, &fence)
        .and_then(|cred| {
            let payload = cred.payload()?;
            Ok(IssueCredentialResponse {
                payee: cred.payee().clone(),
                fence: *cred.fence(),
                issued_at: cred.issued_at(),
                payload,
            })
        });

    match result {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => e.into_response(),
    }
}
