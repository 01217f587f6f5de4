use crate::error::ScanError;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScanResult(String);

impl RawScanResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn from_decoded(decoded: Option<String>) -> Result<Self, ScanError> {
        match decoded {
            Some(text) if !text.trim().is_empty() => Ok(Self(text)),
            Some(_) => Err(ScanError::DecodeFailure("decoder returned blank text".to_string())),
            None => Err(ScanError::DecodeFailure("no QR code found".to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayeeIdentifier(String);

impl PayeeIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn require_non_empty(self) -> Result<Self, ScanError> {
        if self.0.is_empty() {
            return Err(ScanError::EmptyIdentifier);
        }
        Ok(self)
    }
}

impl std::fmt::Display for PayeeIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanDetails {
    pub payee: PayeeIdentifier,
    pub amount: Option<String>,
}

pub trait QrDecoder: Send + Sync {
    fn decode(&self, image: &[u8]) -> Option<String>;
}

pub fn decode_image(decoder: &dyn QrDecoder, image: &[u8]) -> Result<RawScanResult, ScanError> {
    RawScanResult::from_decoded(decoder.decode(image))
}

pub fn extract(raw: &RawScanResult) -> PayeeIdentifier {
    match query_param(raw.as_str(), "pa") {
        Some(value) => PayeeIdentifier(decode_component(value)),
        None => PayeeIdentifier(raw.as_str().to_string()),
    }
}

pub fn extract_details(raw: &RawScanResult) -> ScanDetails {
    ScanDetails {
        payee: extract(raw),
        amount: query_param(raw.as_str(), "am").map(decode_component),
    }
}

// First `key=` that starts the text or follows `?` or `&`; value runs until `&` or end of text.
fn query_param<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("{}=", key);
    let (idx, _) = text
        .match_indices(&needle)
        .find(|(idx, _)| *idx == 0 || matches!(text.as_bytes()[idx - 1], b'?' | b'&'))?;
    let rest = &text[idx + needle.len()..];
    let end = rest.find('&').unwrap_or(rest.len());
    Some(&rest[..end])
}

fn decode_component(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}
