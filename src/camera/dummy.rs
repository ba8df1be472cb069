use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::camera::backend::{CameraBackend, MediaStream};
use crate::camera::error::{CameraError, Result};
use crate::camera::types::Frame;

const DUMMY_BACKEND_NAME: &str = "Dummy Test Camera";

/// Simulated device parameters.
#[derive(Debug, Clone)]
pub struct DummyConfig {
    pub width: u32,
    pub height: u32,
    /// Number of `current_frame` calls answered with `None` after opening,
    /// like a real sensor that has not produced its first frame yet.
    pub warmup_frames: u32,
    /// When set, `open` fails with this error instead of streaming.
    pub failure: Option<CameraError>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            warmup_frames: 0,
            failure: None,
        }
    }
}

/// Fill an RGB buffer with a gradient, shifted by `offset` so consecutive
/// frames differ.
pub fn gradient_frame(width: u32, height: u32, offset: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push(((u64::from(x) + offset) % 256) as u8); // R
            data.push((y % 256) as u8); // G
            data.push(128); // B
        }
    }
    data
}

/// A fake camera backend for running without real hardware.
///
/// Serves a moving gradient test pattern at a fixed resolution. Can be told
/// to fail on open, or to withhold frames for a few reads after opening.
///
/// Enable via `DUMMY_CAMERA=1` environment variable.
pub struct DummyBackend {
    config: DummyConfig,
    live_streams: Arc<AtomicUsize>,
    open_count: AtomicUsize,
}

impl DummyBackend {
    /// Create a DummyBackend with the default 640x480 pattern.
    pub fn new() -> Self {
        Self::with_config(DummyConfig::default())
    }

    pub fn with_config(config: DummyConfig) -> Self {
        Self {
            config,
            live_streams: Arc::new(AtomicUsize::new(0)),
            open_count: AtomicUsize::new(0),
        }
    }

    /// A backend whose every `open` fails with `error`.
    pub fn failing(error: CameraError) -> Self {
        Self::with_config(DummyConfig {
            failure: Some(error),
            ..DummyConfig::default()
        })
    }

    /// Whether the dummy camera is enabled via environment variable.
    pub fn is_enabled() -> bool {
        std::env::var("DUMMY_CAMERA").is_ok_and(|v| v == "1" || v == "true")
    }

    /// Number of opened streams whose tracks have not been stopped.
    pub fn live_streams(&self) -> usize {
        self.live_streams.load(Ordering::Acquire)
    }

    /// Number of successful `open` calls so far.
    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::Acquire)
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraBackend for DummyBackend {
    fn name(&self) -> &str {
        DUMMY_BACKEND_NAME
    }

    async fn open(&self) -> Result<Box<dyn MediaStream>> {
        if let Some(err) = &self.config.failure {
            return Err(err.clone());
        }

        self.open_count.fetch_add(1, Ordering::AcqRel);
        self.live_streams.fetch_add(1, Ordering::AcqRel);

        Ok(Box::new(DummyStream {
            width: self.config.width,
            height: self.config.height,
            warmup_left: Mutex::new(self.config.warmup_frames),
            sequence: AtomicU64::new(0),
            live: AtomicBool::new(true),
            live_streams: Arc::clone(&self.live_streams),
            opened_at: Instant::now(),
        }))
    }
}

struct DummyStream {
    width: u32,
    height: u32,
    warmup_left: Mutex<u32>,
    sequence: AtomicU64,
    live: AtomicBool,
    live_streams: Arc<AtomicUsize>,
    opened_at: Instant,
}

impl MediaStream for DummyStream {
    fn current_frame(&self) -> Option<Frame> {
        if !self.is_live() {
            return None;
        }

        {
            let mut warmup = self.warmup_left.lock();
            if *warmup > 0 {
                *warmup -= 1;
                return None;
            }
        }

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        Some(Frame {
            data: gradient_frame(self.width, self.height, seq),
            width: self.width,
            height: self.height,
            timestamp_us: self.opened_at.elapsed().as_micros() as u64,
        })
    }

    fn stop_tracks(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            self.live_streams.fetch_sub(1, Ordering::AcqRel);
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

impl Drop for DummyStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}
