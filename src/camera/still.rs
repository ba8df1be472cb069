//! Camera backend that streams a still image file.
//!
//! Handy for exercising the auto-detect path on a machine without a camera:
//! every frame read returns the same decoded picture.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::camera::backend::{CameraBackend, MediaStream};
use crate::camera::error::{CameraError, Result};
use crate::camera::types::Frame;

pub struct StillImageBackend {
    path: PathBuf,
}

impl StillImageBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Decode an image file into an RGB frame.
pub fn load_image_as_frame(path: &Path) -> Result<Frame> {
    let img = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            CameraError::NoDevice(format!("{}: {io}", path.display()))
        }
        image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            CameraError::PermissionDenied(format!("{}: {io}", path.display()))
        }
        other => CameraError::Unknown(format!("{}: {other}", path.display())),
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame {
        data: rgb.into_raw(),
        width,
        height,
        timestamp_us: 0,
    })
}

#[async_trait]
impl CameraBackend for StillImageBackend {
    fn name(&self) -> &str {
        "still image"
    }

    async fn open(&self) -> Result<Box<dyn MediaStream>> {
        let path = self.path.clone();
        let frame = tokio::task::spawn_blocking(move || load_image_as_frame(&path))
            .await
            .map_err(|e| CameraError::Unknown(format!("image loader panicked: {e}")))??;

        info!(
            path = %self.path.display(),
            width = frame.width,
            height = frame.height,
            "Still image source opened"
        );

        Ok(Box::new(StillStream {
            frame,
            live: AtomicBool::new(true),
        }))
    }
}

struct StillStream {
    frame: Frame,
    live: AtomicBool,
}

impl MediaStream for StillStream {
    fn current_frame(&self) -> Option<Frame> {
        self.is_live().then(|| self.frame.clone())
    }

    fn stop_tracks(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            debug!("Still image source stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}
