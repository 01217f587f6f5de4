use crate::error::CredentialError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

pub fn error_response(status: StatusCode, code: &str, message: &str, details: Option<String>) -> Response {
    (
        status,
        Json(ErrorEnvelope {
            error: ErrorPayload {
                code: code.to_string(),
                message: message.to_string(),
                details,
            },
        }),
    )
        .into_response()
}

impl IntoResponse for CredentialError {
    fn into_response(self) -> Response {
        let status = match &self {
            CredentialError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        error_response(status, self.code(), &self.to_string(), None)
    }
}
