use async_trait::async_trait;

use super::error::TransportError;

/// An image on its way to the detection service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
        }
    }
}

/// Result of a single detection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// A document was found; carries the cropped image.
    Detected(Vec<u8>),
    /// The service answered properly but saw no document.
    NotDetected,
    /// No usable answer.
    TransportError(TransportError),
}

impl DetectionOutcome {
    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected(_))
    }
}

impl From<Result<Option<Vec<u8>>, TransportError>> for DetectionOutcome {
    fn from(result: Result<Option<Vec<u8>>, TransportError>) -> Self {
        match result {
            Ok(Some(crop)) => Self::Detected(crop),
            Ok(None) => Self::NotDetected,
            Err(e) => Self::TransportError(e),
        }
    }
}

/// The remote document detector.
///
/// Every submission asks for the cropped document back.
#[async_trait]
pub trait DetectionService: Send + Sync {
    async fn submit(&self, image: ImageUpload) -> DetectionOutcome;
}
