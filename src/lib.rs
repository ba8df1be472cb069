pub mod camera;
pub mod capture;
pub mod detection;
pub mod diagnostics;
pub mod machine;
pub mod polling;
pub mod settings;

use std::path::Path;
use std::sync::Arc;

use camera::dummy::DummyBackend;
use camera::still::StillImageBackend;
use camera::CameraBackend;
use detection::{HttpDetectionClient, TransportError};
use machine::CaptureStateMachine;
use settings::Settings;

/// Create the camera backend.
///
/// A still image, when given, is served as the live feed. Otherwise, or when
/// `DUMMY_CAMERA=1` is set, a simulated camera is used.
pub fn create_camera_backend(still: Option<&Path>) -> Arc<dyn CameraBackend> {
    select_camera_backend(still, DummyBackend::is_enabled())
}

fn select_camera_backend(still: Option<&Path>, force_dummy: bool) -> Arc<dyn CameraBackend> {
    match still {
        Some(path) if !force_dummy => Arc::new(StillImageBackend::new(path)),
        _ => Arc::new(DummyBackend::new()),
    }
}

/// Wire a state machine to the HTTP detection service described by `settings`.
pub fn create_machine(
    settings: &Settings,
    camera: Arc<dyn CameraBackend>,
) -> Result<CaptureStateMachine, TransportError> {
    let detector = HttpDetectionClient::new(&settings.service)?;
    Ok(CaptureStateMachine::new(
        camera,
        Arc::new(detector),
        &settings.capture,
    ))
}
