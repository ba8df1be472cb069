use serde::Serialize;
use std::fmt;

/// Where the capture flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureState {
    #[default]
    Idle,
    FileSelected,
    CameraPreview,
    AutoDetecting,
    CandidateReady,
    Submitting,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::FileSelected => "file selected",
            Self::CameraPreview => "camera preview",
            Self::AutoDetecting => "auto-detecting",
            Self::CandidateReady => "candidate ready",
            Self::Submitting => "submitting",
        };
        f.write_str(label)
    }
}
