use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::detection::ImageUpload;

/// Logical name of a manually captured frame.
pub const CAPTURED_IMAGE_NAME: &str = "captured-image.jpg";
/// Logical name of a frame submitted by the polling loop.
pub const POLL_FRAME_NAME: &str = "frame.jpg";
/// Logical name of an automatically detected crop.
pub const DETECTED_DOCUMENT_NAME: &str = "detected-document.jpg";

/// How the candidate came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    UserSelected,
    ManualCapture,
    AutoDetected,
}

/// Candidate bytes, tagged with whether the service already cropped them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// As selected or captured; not yet seen by the detection service.
    Raw(Vec<u8>),
    /// The document crop returned by the detection service.
    Crop(Vec<u8>),
}

impl ImagePayload {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Raw(bytes) | Self::Crop(bytes) => bytes,
        }
    }

    pub fn is_crop(&self) -> bool {
        matches!(self, Self::Crop(_))
    }
}

/// A file picked by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, naming it after its final path component.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// The image currently considered "the document".
///
/// Immutable: every change produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateImage {
    payload: ImagePayload,
    name: String,
    captured_at: Option<DateTime<Local>>,
    provenance: Provenance,
}

impl CandidateImage {
    pub fn user_selected(file: SelectedFile) -> Self {
        Self {
            payload: ImagePayload::Raw(file.bytes),
            name: file.name,
            captured_at: None,
            provenance: Provenance::UserSelected,
        }
    }

    pub fn manual_capture(jpeg: Vec<u8>, captured_at: DateTime<Local>) -> Self {
        Self {
            payload: ImagePayload::Raw(jpeg),
            name: CAPTURED_IMAGE_NAME.to_string(),
            captured_at: Some(captured_at),
            provenance: Provenance::ManualCapture,
        }
    }

    pub fn auto_detected(crop: Vec<u8>, captured_at: DateTime<Local>) -> Self {
        Self {
            payload: ImagePayload::Crop(crop),
            name: DETECTED_DOCUMENT_NAME.to_string(),
            captured_at: Some(captured_at),
            provenance: Provenance::AutoDetected,
        }
    }

    /// The same candidate with the service's crop as payload.
    pub fn with_crop(self, crop: Vec<u8>) -> Self {
        Self {
            payload: ImagePayload::Crop(crop),
            ..self
        }
    }

    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }

    pub fn bytes(&self) -> &[u8] {
        self.payload.bytes()
    }

    pub fn is_crop(&self) -> bool {
        self.payload.is_crop()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn captured_at(&self) -> Option<DateTime<Local>> {
        self.captured_at
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Wall-clock capture time as `HH:MM:SS`.
    pub fn capture_time_label(&self) -> Option<String> {
        self.captured_at.map(|t| t.format("%H:%M:%S").to_string())
    }

    pub(crate) fn to_upload(&self) -> ImageUpload {
        ImageUpload::new(self.bytes().to_vec(), self.name.clone())
    }
}
