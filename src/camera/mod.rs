// Camera domain: device access and session lifecycle.

pub mod backend;
pub mod dummy;
pub mod error;
pub mod session;
pub mod still;
pub mod types;

pub use backend::{CameraBackend, MediaStream};
pub use error::{CameraError, CaptureError};
pub use session::CameraSession;
pub use types::{CameraState, Frame};
