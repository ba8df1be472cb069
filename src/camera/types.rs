use serde::Serialize;
use std::fmt;

/// A single raw frame read from a live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw pixel data (RGB).
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture timestamp in microseconds since the stream opened.
    pub timestamp_us: u64,
}

/// Lifecycle state of a camera session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraState {
    #[default]
    Inactive,
    Starting,
    Active,
}

impl CameraState {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl fmt::Display for CameraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Inactive => "inactive",
            Self::Starting => "starting",
            Self::Active => "active",
        };
        f.write_str(label)
    }
}
