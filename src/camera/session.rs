use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::camera::backend::{CameraBackend, MediaStream};
use crate::camera::error::Result;
use crate::camera::types::CameraState;

/// Owns the media stream for one camera.
///
/// Holds at most one stream. The stream itself is never exposed mutably;
/// frame readers borrow it through [`CameraSession::stream`].
pub struct CameraSession {
    backend: Arc<dyn CameraBackend>,
    stream: Option<Box<dyn MediaStream>>,
    state: CameraState,
}

impl CameraSession {
    pub fn new(backend: Arc<dyn CameraBackend>) -> Self {
        Self {
            backend,
            stream: None,
            state: CameraState::Inactive,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// The live stream, if the session is active.
    pub fn stream(&self) -> Option<&dyn MediaStream> {
        self.stream.as_deref()
    }

    /// Acquire the camera.
    ///
    /// Starting an already active session keeps the current stream. On
    /// failure the session is left inactive.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_active() {
            debug!(backend = self.backend.name(), "Camera already active");
            return Ok(());
        }

        self.state = CameraState::Starting;
        info!(backend = self.backend.name(), "Starting camera");

        match self.backend.open().await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = CameraState::Active;
                info!(backend = self.backend.name(), "Camera active");
                Ok(())
            }
            Err(e) => {
                self.stream = None;
                self.state = CameraState::Inactive;
                warn!(backend = self.backend.name(), "Error accessing the camera: {e}");
                Err(e)
            }
        }
    }

    /// Release every track and forget the stream. Idempotent.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.stop_tracks();
            info!(backend = self.backend.name(), "Camera stopped");
        }
        self.state = CameraState::Inactive;
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}
