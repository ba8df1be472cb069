use tracing::debug;

use super::compress::compress_jpeg;
use crate::camera::backend::MediaStream;
use crate::camera::error::CaptureError;

/// Default JPEG quality for captured frames.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// A still image taken from a live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Rasterises the current frame of a video source into a JPEG still.
#[derive(Debug, Clone, Copy)]
pub struct FrameCapture {
    quality: u8,
}

impl FrameCapture {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode whatever the source shows right now, at its native resolution.
    ///
    /// Fails with [`CaptureError::NoFrame`] while the source has no frame
    /// (stopped, or still warming up).
    pub fn snapshot(&self, source: &dyn MediaStream) -> Result<Snapshot, CaptureError> {
        let frame = source.current_frame().ok_or(CaptureError::NoFrame)?;
        let jpeg = compress_jpeg(&frame.data, frame.width, frame.height, self.quality)?;
        debug!(
            width = frame.width,
            height = frame.height,
            bytes = jpeg.len(),
            "Frame captured"
        );
        Ok(Snapshot {
            jpeg,
            width: frame.width,
            height: frame.height,
        })
    }
}

impl Default for FrameCapture {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::backend::CameraBackend;
    use crate::camera::dummy::{DummyBackend, DummyConfig};

    #[tokio::test]
    async fn snapshot_encodes_native_resolution_jpeg() {
        let backend = DummyBackend::with_config(DummyConfig {
            width: 320,
            height: 240,
            ..DummyConfig::default()
        });
        let stream = backend.open().await.unwrap();

        let shot = FrameCapture::default().snapshot(stream.as_ref()).unwrap();
        assert_eq!((shot.width, shot.height), (320, 240));
        assert_eq!(&shot.jpeg[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&shot.jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 240));
    }

    #[tokio::test]
    async fn snapshot_during_warmup_is_no_frame() {
        let backend = DummyBackend::with_config(DummyConfig {
            warmup_frames: 1,
            ..DummyConfig::default()
        });
        let stream = backend.open().await.unwrap();

        let err = FrameCapture::default().snapshot(stream.as_ref()).unwrap_err();
        assert_eq!(err, CaptureError::NoFrame);
        assert!(FrameCapture::default().snapshot(stream.as_ref()).is_ok());
    }

    #[tokio::test]
    async fn snapshot_of_stopped_stream_is_no_frame() {
        let stream = DummyBackend::new().open().await.unwrap();
        stream.stop_tracks();
        let err = FrameCapture::new(70).snapshot(stream.as_ref()).unwrap_err();
        assert_eq!(err, CaptureError::NoFrame);
    }
}
