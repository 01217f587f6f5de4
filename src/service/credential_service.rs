use crate::domain::credential::{issue, GeoCredential};
use crate::domain::geofence::{GeoPoint, GeofenceConstraint};
use crate::domain::scan::{extract, extract_details, RawScanResult, ScanDetails};
use crate::error::CredentialError;

#[derive(Debug, Clone, Default)]
pub struct FenceRequest {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_m: Option<f64>,
}

#[derive(Clone)]
pub struct CredentialService {
    pub default_fence: GeofenceConstraint,
}

impl CredentialService {
    pub fn scan(&self, raw_text: &str) -> Result<ScanDetails, CredentialError> {
        let raw = RawScanResult::from_decoded(Some(raw_text.to_string()))?;
        let details = extract_details(&raw);
        details.payee.clone().require_non_empty()?;
        Ok(details)
    }

    pub fn issue_from_scan(&self, raw_text: &str, fence: &FenceRequest) -> Result<GeoCredential, CredentialError> {
        let raw = RawScanResult::from_decoded(Some(raw_text.to_string()))?;
        let payee = extract(&raw).require_non_empty()?;
        let fence = GeofenceConstraint {
            center: GeoPoint {
                lat: fence.lat.unwrap_or(self.default_fence.center.lat),
                lon: fence.lon.unwrap_or(self.default_fence.center.lon),
            },
            radius_m: fence.radius_m.unwrap_or(self.default_fence.radius_m),
        };
        let credential = issue(payee, fence)?;
        tracing::info!(
            payee = %credential.payee(),
            lat = credential.fence().center.lat,
            lon = credential.fence().center.lon,
            radius_m = credential.fence().radius_m,
            "geo credential issued"
        );
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;

    fn service() -> CredentialService {
        CredentialService {
            default_fence: GeofenceConstraint {
                center: GeoPoint::new(28.7041, 77.1025),
                radius_m: 100_000.0,
            },
        }
    }

    #[test]
    fn applies_default_fence() {
        let cred = service()
            .issue_from_scan("upi://pay?pa=merchant@bank&am=250", &FenceRequest::default())
            .unwrap();
        assert_eq!(cred.payee().as_str(), "merchant@bank");
        assert_eq!(cred.fence().radius_m, 100_000.0);
    }

    #[test]
    fn blank_scan_is_a_decode_failure() {
        let err = service().scan("  ").unwrap_err();
        assert!(matches!(err, CredentialError::Scan(ScanError::DecodeFailure(_))));
    }

    #[test]
    fn empty_payee_is_rejected() {
        let err = service()
            .issue_from_scan("upi://pay?pa=&am=1", &FenceRequest::default())
            .unwrap_err();
        assert_eq!(err.code(), "EMPTY_IDENTIFIER");
    }

    #[test]
    fn override_radius_is_validated() {
        let err = service()
            .issue_from_scan(
                "pa=m@bank",
                &FenceRequest {
                    radius_m: Some(0.0),
                    ..FenceRequest::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_GEOFENCE");
    }
}
