//! Wire contract for the document detection service.
//!
//! The service takes a multipart form describing the document and the image,
//! and answers with a JSON object that carries the cropped document when one
//! was found.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

/// Multipart form field names.
pub mod field {
    pub const DOCUMENT_SIDE: &str = "documentSide";
    pub const DOCUMENT_TYPE: &str = "documentType";
    pub const IMAGE: &str = "image";
    pub const LICENSE_ID: &str = "licenseId";
    pub const RETURN_CROPPED_IMAGE: &str = "returnCroppedImage";
}

/// Only the front side is ever submitted.
pub const DOCUMENT_SIDE_FRONT: &str = "front";

/// ID-1 sized identity card (ICAO 9303 TD1).
pub const DOCUMENT_TYPE_TD1: &str = "TD1";

/// License identifier used when no other one is configured.
pub const DEFAULT_LICENSE_ID: &str = "mobbscan-challenge";

/// Content type of every submitted image.
pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Errors raised while interpreting a service response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("response is not a JSON object: {0}")]
    NotJson(String),

    #[error("unexpected imageDocumentDetected value: {0}")]
    UnexpectedField(String),

    #[error("cropped image is not valid base64: {0}")]
    InvalidImage(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, WireError>;

/// Text fields sent alongside the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRequest {
    pub license_id: String,
}

impl DetectionRequest {
    pub fn new(license_id: impl Into<String>) -> Self {
        Self {
            license_id: license_id.into(),
        }
    }

    /// Every non-image form field, in submission order.
    ///
    /// The crop is always requested, so `returnCroppedImage` is fixed.
    pub fn text_fields(&self) -> [(&'static str, String); 4] {
        [
            (field::DOCUMENT_SIDE, DOCUMENT_SIDE_FRONT.to_string()),
            (field::DOCUMENT_TYPE, DOCUMENT_TYPE_TD1.to_string()),
            (field::LICENSE_ID, self.license_id.clone()),
            (field::RETURN_CROPPED_IMAGE, "true".to_string()),
        ]
    }
}

impl Default for DetectionRequest {
    fn default() -> Self {
        Self::new(DEFAULT_LICENSE_ID)
    }
}

#[derive(Debug, Deserialize)]
struct DetectionResponse {
    #[serde(rename = "imageDocumentDetected", default)]
    image_document_detected: Option<serde_json::Value>,
}

/// Parse a response body.
///
/// Returns `Ok(Some(crop))` when a document was detected and `Ok(None)` when
/// the field is absent or falsy (`null`, `false`, `""`, `0`).
pub fn parse_response(body: &[u8]) -> Result<Option<Vec<u8>>> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| WireError::NotJson(e.to_string()))?;
    if !value.is_object() {
        return Err(WireError::NotJson(format!("expected an object, got {value}")));
    }
    let response: DetectionResponse =
        serde_json::from_value(value).map_err(|e| WireError::NotJson(e.to_string()))?;

    match response.image_document_detected {
        None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => Ok(None),
        Some(serde_json::Value::String(s)) if s.is_empty() => Ok(None),
        Some(serde_json::Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(serde_json::Value::String(s)) => decode_image(&s).map(Some),
        Some(other) => Err(WireError::UnexpectedField(other.to_string())),
    }
}

/// Decode a base64 image, tolerating a `data:<mime>;base64,` prefix.
pub fn decode_image(encoded: &str) -> Result<Vec<u8>> {
    let payload = match encoded.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| WireError::InvalidImage("data URL without payload".to_string()))?,
        None => encoded,
    };

    STANDARD
        .decode(payload.trim())
        .map_err(|e| WireError::InvalidImage(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fields_request_front_td1_crop() {
        let fields = DetectionRequest::new("lic-42").text_fields();
        assert_eq!(fields[0], ("documentSide", "front".to_string()));
        assert_eq!(fields[1], ("documentType", "TD1".to_string()));
        assert_eq!(fields[2], ("licenseId", "lic-42".to_string()));
        assert_eq!(fields[3], ("returnCroppedImage", "true".to_string()));
    }

    #[test]
    fn default_request_uses_default_license() {
        assert_eq!(DetectionRequest::default().license_id, DEFAULT_LICENSE_ID);
    }

    #[test]
    fn parse_response_returns_decoded_crop() {
        let body = br#"{"imageDocumentDetected":"/9j/AQID"}"#;
        let crop = parse_response(body).unwrap().unwrap();
        assert_eq!(crop, vec![0xFF, 0xD8, 0xFF, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn parse_response_accepts_data_url() {
        let body = br#"{"imageDocumentDetected":"data:image/jpeg;base64,/9j/AQID"}"#;
        let crop = parse_response(body).unwrap().unwrap();
        assert_eq!(&crop[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn parse_response_missing_field_is_not_detected() {
        assert_eq!(parse_response(br#"{"status":"ok"}"#).unwrap(), None);
    }

    #[test]
    fn parse_response_falsy_values_are_not_detected() {
        for body in [
            r#"{"imageDocumentDetected":null}"#,
            r#"{"imageDocumentDetected":false}"#,
            r#"{"imageDocumentDetected":""}"#,
            r#"{"imageDocumentDetected":0}"#,
        ] {
            assert_eq!(parse_response(body.as_bytes()).unwrap(), None, "{body}");
        }
    }

    #[test]
    fn parse_response_rejects_non_json() {
        let err = parse_response(b"<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, WireError::NotJson(_)));
    }

    #[test]
    fn parse_response_rejects_non_object() {
        let err = parse_response(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, WireError::NotJson(_)));
    }

    #[test]
    fn parse_response_rejects_truthy_non_string() {
        let err = parse_response(br#"{"imageDocumentDetected":true}"#).unwrap_err();
        assert!(matches!(err, WireError::UnexpectedField(_)));
    }

    #[test]
    fn decode_image_rejects_garbage() {
        assert!(matches!(
            decode_image("not base64 at all!"),
            Err(WireError::InvalidImage(_))
        ));
    }

    #[test]
    fn decode_image_rejects_data_url_without_comma() {
        assert!(matches!(
            decode_image("data:image/jpeg;base64"),
            Err(WireError::InvalidImage(_))
        ));
    }
}
