use thiserror::Error;

use super::state::CaptureState;
use crate::camera::error::{CameraError, CaptureError};
use crate::detection::TransportError;
use crate::polling::PollError;

/// Failure of a user-triggered action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: CaptureState,
    },

    #[error("could not access the camera: {0}")]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Polling(#[from] PollError),

    #[error("no document has been uploaded or detected")]
    NothingToSubmit,

    #[error("no document was detected")]
    NotDetected,

    #[error("an error occurred while processing the image: {0}")]
    Submission(TransportError),
}
