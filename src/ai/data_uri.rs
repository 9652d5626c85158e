//! `data:<mime>;base64,<payload>` parsing and encoding.

use crate::{Error, Result};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

/// Standard alphabet with optional padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Build a data URI from raw image bytes, sniffing the MIME type.
    pub fn from_image_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = super::mime::detect_image_mime(&bytes);
        Self::new(mime_type, bytes)
    }

    /// Parse a base64 data URI. Any MIME type is accepted; parameters other
    /// than the `base64` marker (e.g. `charset`) are ignored.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| Error::Validation("Image must be a data URI".to_string()))?;

        let (header, payload) = rest.split_once(',').ok_or_else(|| {
            Error::Validation("Image data URI is missing its payload".to_string())
        })?;

        let mut params = header.split(';');
        let mime_type = params.next().unwrap_or_default().trim();
        if mime_type.is_empty() || !mime_type.contains('/') {
            return Err(Error::Validation(format!(
                "Image data URI has an invalid MIME type: '{}'",
                mime_type
            )));
        }

        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(Error::Validation(
                "Image data URI must be base64 encoded".to_string(),
            ));
        }

        // Payloads may be line-wrapped.
        let payload: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = PAYLOAD_ENGINE
            .decode(&payload)
            .map_err(|e| {
                Error::Validation(format!("Image data URI payload is not valid base64: {}", e))
            })?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    pub fn base64_payload(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn to_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_payload())
    }
}
