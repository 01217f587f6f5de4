use crate::domain::geofence::GeofenceConstraint;
use crate::domain::geofence::GeoPoint;
use crate::domain::scan::PayeeIdentifier;
use crate::error::CredentialError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub const PAYLOAD_PREFIX: &str = "geoqr:v1:";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoCredential {
    payee: PayeeIdentifier,
    fence: GeofenceConstraint,
    issued_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct CanonicalFence {
    lat: f64,
    lon: f64,
    radius_m: f64,
}

#[derive(Serialize)]
struct CanonicalBody<'a> {
    payee: &'a str,
    fence: CanonicalFence,
}

impl GeoCredential {
    pub fn payee(&self) -> &PayeeIdentifier {
        &self.payee
    }

    pub fn fence(&self) -> &GeofenceConstraint {
        &self.fence
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.fence.contains(point)
    }

    /// Payload handed to the QR renderer: prefix, canonical JSON of `{payee, fence}`, and a
    /// SHA-256 digest of that JSON. `issued_at` is not part of it.
    pub fn payload(&self) -> Result<String, CredentialError> {
        let body = CanonicalBody {
            payee: self.payee.as_str(),
            fence: CanonicalFence {
                lat: self.fence.center.lat,
                lon: self.fence.center.lon,
                radius_m: self.fence.radius_m,
            },
        };
        let json = serde_json::to_string(&body).map_err(|e| CredentialError::Encoding(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Ok(format!("{}{}#{}", PAYLOAD_PREFIX, json, digest))
    }
}

pub fn issue(payee: PayeeIdentifier, fence: GeofenceConstraint) -> Result<GeoCredential, CredentialError> {
    issue_at(payee, fence, Utc::now())
}

pub fn issue_at(
    payee: PayeeIdentifier,
    fence: GeofenceConstraint,
    issued_at: DateTime<Utc>,
) -> Result<GeoCredential, CredentialError> {
    fence.validate()?;
    let payee = payee.require_non_empty()?;
    Ok(GeoCredential {
        payee,
        fence,
        issued_at,
    })
}

pub fn verify_payload(payload: &str) -> bool {
    let Some(rest) = payload.strip_prefix(PAYLOAD_PREFIX) else {
        return false;
    };
    let Some((json, digest)) = rest.rsplit_once('#') else {
        return false;
    };
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    hex::encode(hasher.finalize()) == digest
}
