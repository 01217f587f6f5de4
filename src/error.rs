use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("scanned payload yielded an empty payee identifier")]
    EmptyIdentifier,
    #[error("no usable text could be decoded: {0}")]
    DecodeFailure(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeofenceError {
    #[error("invalid geofence: {reason}")]
    InvalidGeofence { reason: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CredentialError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Geofence(#[from] GeofenceError),
    #[error("failed to serialize credential payload: {0}")]
    Encoding(String),
}

impl CredentialError {
    pub fn code(&self) -> &'static str {
        match self {
            CredentialError::Scan(ScanError::EmptyIdentifier) => "EMPTY_IDENTIFIER",
            CredentialError::Scan(ScanError::DecodeFailure(_)) => "DECODE_FAILURE",
            CredentialError::Geofence(GeofenceError::InvalidGeofence { .. }) => "INVALID_GEOFENCE",
            CredentialError::Encoding(_) => "ENCODING_FAILURE",
        }
    }
}
