use async_trait::async_trait;

use crate::camera::error::Result;
use crate::camera::types::Frame;

/// Platform-agnostic access to the video capture device.
///
/// Opening the device is where the platform asks for permission, so it is
/// the only fallible, asynchronous step. Everything after that reads from the
/// returned [`MediaStream`].
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Short human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Request video access and open a live stream.
    async fn open(&self) -> Result<Box<dyn MediaStream>>;
}

/// A live video stream.
///
/// The stream does not queue frames: `current_frame` is a view of whatever
/// the device is showing right now.
pub trait MediaStream: Send + Sync {
    /// The frame currently on screen, or `None` while the device warms up.
    fn current_frame(&self) -> Option<Frame>;

    /// Stop every track of the stream. Idempotent.
    fn stop_tracks(&self);

    /// Whether any track is still running.
    fn is_live(&self) -> bool;
}
