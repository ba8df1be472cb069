use serde::{Deserialize, Serialize};

use crate::capture::snapshot::DEFAULT_JPEG_QUALITY;

/// Endpoint used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://example.com/api";

/// Detection service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceSettings {
    pub api_url: String,
    pub license_id: String,
    pub request_timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            license_id: docdetect_wire::DEFAULT_LICENSE_ID.to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Frame sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureSettings {
    /// Auto-detect sampling period.
    pub poll_interval_ms: u64,
    pub jpeg_quality: u8,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl CaptureSettings {
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Top-level settings file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub service: ServiceSettings,
    pub capture: CaptureSettings,
}
