use thiserror::Error;

/// Camera subsystem errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("no camera device available: {0}")]
    NoDevice(String),

    #[error("camera failed to start: {0}")]
    Unknown(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CameraError>;

/// Errors raised while turning the live frame into a still image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("no frame available from the video source")]
    NoFrame,

    #[error("frame encoding failed: {0}")]
    Encode(String),
}
