//! Capture/detection state machine.
//!
//! Owns the candidate image and decides when the camera and the polling loop
//! run. Poll ticks and detection answers come back through a single event
//! queue and are applied one at a time by [`CaptureStateMachine::pump`]; an
//! answer is applied only if the polling run that asked for it is still the
//! live one.

pub mod candidate;
pub mod error;
pub mod state;


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};

use crate::camera::{CameraBackend, CameraSession, CameraState, CaptureError};
use crate::capture::FrameCapture;
use crate::detection::{DetectionOutcome, DetectionService, ImageUpload};
use crate::diagnostics::{DetectionSnapshot, DetectionStats};
use crate::polling::{PollHandle, PollingLoop};
use crate::settings::CaptureSettings;

pub use candidate::{CandidateImage, ImagePayload, Provenance, SelectedFile};
pub use error::ActionError;
pub use state::CaptureState;

/// Result of [`CaptureStateMachine::open_camera`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraOpen {
    Started,
    /// The camera was already running; nothing changed.
    AlreadyActive,
}

/// Result of a successful [`CaptureStateMachine::upload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The candidate was already a crop; no request was made.
    Confirmed,
    /// The service returned a crop, which is now the candidate.
    Detected,
}

#[derive(Debug)]
enum MachineEvent {
    Tick(PollHandle),
    Detection {
        run: PollHandle,
        outcome: DetectionOutcome,
    },
}

pub struct CaptureStateMachine {
    camera: CameraSession,
    poller: PollingLoop,
    capture: FrameCapture,
    detector: Arc<dyn DetectionService>,
    poll_interval: Duration,
    state: CaptureState,
    candidate: Option<CandidateImage>,
    stats: DetectionStats,
    /// Set while a tick of the live run waits in the queue.
    tick_queued: Arc<AtomicBool>,
    /// Detection requests spawned by ticks whose outcome is not yet applied.
    in_flight: usize,
    events_tx: mpsc::UnboundedSender<MachineEvent>,
    events_rx: mpsc::UnboundedReceiver<MachineEvent>,
}

impl CaptureStateMachine {
    pub fn new(
        camera: Arc<dyn CameraBackend>,
        detector: Arc<dyn DetectionService>,
        settings: &CaptureSettings,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            camera: CameraSession::new(camera),
            poller: PollingLoop::new(),
            capture: FrameCapture::new(settings.jpeg_quality),
            detector,
            poll_interval: settings.poll_interval(),
            state: CaptureState::Idle,
            candidate: None,
            stats: DetectionStats::new(),
            tick_queued: Arc::new(AtomicBool::new(false)),
            in_flight: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn camera_state(&self) -> CameraState {
        self.camera.state()
    }

    pub fn candidate(&self) -> Option<&CandidateImage> {
        self.candidate.as_ref()
    }

    /// Handle of the live polling run; present only while auto-detecting.
    pub fn poll_handle(&self) -> Option<PollHandle> {
        self.poller.current()
    }

    /// Whether a manual capture can be taken right now.
    pub fn capture_available(&self) -> bool {
        self.state == CaptureState::CameraPreview && self.camera.is_active()
    }

    /// Counters of the current (or last) auto-detect run.
    pub fn stats(&self) -> DetectionSnapshot {
        self.stats.snapshot()
    }

    /// Replace everything with a freshly selected file.
    pub fn select_file(&mut self, file: SelectedFile) {
        self.teardown();
        info!(name = %file.name, bytes = file.bytes.len(), "File selected");
        self.candidate = Some(CandidateImage::user_selected(file));
        self.transition(CaptureState::FileSelected);
    }

    /// Start the camera for live preview.
    pub async fn open_camera(&mut self) -> Result<CameraOpen, ActionError> {
        if self.camera.is_active() {
            warn!("The camera is already open");
            return Ok(CameraOpen::AlreadyActive);
        }

        match self.camera.start().await {
            Ok(()) => {
                self.transition(CaptureState::CameraPreview);
                Ok(CameraOpen::Started)
            }
            Err(e) => {
                self.teardown();
                self.settle();
                Err(e.into())
            }
        }
    }

    /// Take the current preview frame as the candidate and stop the camera.
    pub fn capture_now(&mut self) -> Result<(), ActionError> {
        if self.state != CaptureState::CameraPreview {
            return Err(ActionError::InvalidState {
                operation: "capture a frame",
                state: self.state,
            });
        }

        let stream = self.camera.stream().ok_or(CaptureError::NoFrame)?;
        let shot = self.capture.snapshot(stream)?;

        info!(
            width = shot.width,
            height = shot.height,
            bytes = shot.jpeg.len(),
            "Frame captured manually"
        );
        self.candidate = Some(CandidateImage::manual_capture(shot.jpeg, Local::now()));
        self.camera.stop();
        self.transition(CaptureState::CandidateReady);
        Ok(())
    }

    /// Open the camera if needed and start sampling frames for detection.
    pub async fn start_auto_detect(&mut self) -> Result<PollHandle, ActionError> {
        match self.state {
            CaptureState::Idle | CaptureState::FileSelected | CaptureState::CameraPreview => {}
            state => {
                return Err(ActionError::InvalidState {
                    operation: "start auto-detect",
                    state,
                });
            }
        }

        if let Err(e) = self.camera.start().await {
            self.teardown();
            self.settle();
            return Err(e.into());
        }

        // Ticks that fire while one is still queued are dropped, so a slow
        // consumer sees at most one.
        let tick_queued = Arc::new(AtomicBool::new(false));
        let queued = Arc::clone(&tick_queued);
        let tx = self.events_tx.clone();
        let started = self.poller.start(self.poll_interval, move |run| {
            if !queued.swap(true, Ordering::AcqRel) {
                let _ = tx.send(MachineEvent::Tick(run));
            }
        });
        let run = match started {
            Ok(run) => run,
            Err(e) => {
                self.teardown();
                self.settle();
                return Err(e.into());
            }
        };

        self.tick_queued = tick_queued;
        self.stats.reset();
        self.transition(CaptureState::AutoDetecting);
        Ok(run)
    }

    /// Stop the camera and any polling run.
    pub fn stop_camera(&mut self) {
        self.teardown();
        if matches!(
            self.state,
            CaptureState::CameraPreview | CaptureState::AutoDetecting
        ) {
            self.settle();
        }
    }

    /// Submit the candidate, or confirm it if it is already a crop.
    ///
    /// The camera and polling loop are always stopped first.
    pub async fn upload(&mut self) -> Result<UploadOutcome, ActionError> {
        self.teardown();

        let upload = match &self.candidate {
            None => {
                warn!("No file selected or document detected");
                self.settle();
                return Err(ActionError::NothingToSubmit);
            }
            Some(candidate) if candidate.is_crop() => {
                info!(name = candidate.name(), "Detected document confirmed");
                self.transition(CaptureState::CandidateReady);
                return Ok(UploadOutcome::Confirmed);
            }
            Some(candidate) => candidate.to_upload(),
        };

        info!(name = %upload.file_name, bytes = upload.bytes.len(), "Uploading candidate");
        self.transition(CaptureState::Submitting);
        let outcome = self.detector.submit(upload).await;
        self.teardown();

        match outcome {
            DetectionOutcome::Detected(crop) => {
                self.candidate = self.candidate.take().map(|c| c.with_crop(crop));
                self.transition(CaptureState::CandidateReady);
                Ok(UploadOutcome::Detected)
            }
            DetectionOutcome::NotDetected => {
                warn!("No document was detected in the submitted image");
                self.candidate = None;
                self.transition(CaptureState::Idle);
                Err(ActionError::NotDetected)
            }
            DetectionOutcome::TransportError(e) => {
                error!("Error submitting the image: {e}");
                self.candidate = None;
                self.transition(CaptureState::Idle);
                Err(ActionError::Submission(e))
            }
        }
    }

    /// Wait for the next queued event and apply it.
    ///
    /// Returns `false` without waiting when the queue is empty and nothing
    /// can add to it: no polling run and no request in flight.
    pub async fn pump(&mut self) -> bool {
        let event = match self.events_rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) if self.poller.is_running() || self.in_flight > 0 => {
                self.events_rx.recv().await
            }
            Err(_) => None,
        };
        match event {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply every event already queued without waiting. Returns how many.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Drive auto-detect until it ends. Returns `true` if a document was
    /// detected, `false` if auto-detect was not running.
    pub async fn wait_for_detection(&mut self) -> bool {
        if self.state != CaptureState::AutoDetecting {
            return false;
        }
        while self.state == CaptureState::AutoDetecting {
            if !self.pump().await {
                break;
            }
        }
        self.candidate
            .as_ref()
            .is_some_and(|c| c.provenance() == Provenance::AutoDetected)
    }

    fn handle_event(&mut self, event: MachineEvent) {
        match event {
            MachineEvent::Tick(run) => self.on_tick(run),
            MachineEvent::Detection { run, outcome } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.on_detection(run, outcome);
            }
        }
    }

    fn is_live_run(&self, run: PollHandle) -> bool {
        self.state == CaptureState::AutoDetecting && self.poller.current() == Some(run)
    }

    fn on_tick(&mut self, run: PollHandle) {
        if !self.is_live_run(run) {
            debug!(%run, "Dropping tick from a finished polling run");
            return;
        }
        self.tick_queued.store(false, Ordering::Release);
        self.stats.record_tick();

        let Some(stream) = self.camera.stream() else {
            self.stats.record_capture_miss();
            return;
        };
        let shot = match self.capture.snapshot(stream) {
            Ok(shot) => shot,
            Err(e) => {
                debug!(%run, "Skipping tick: {e}");
                self.stats.record_capture_miss();
                return;
            }
        };

        self.stats.record_submission(shot.jpeg.len());
        let detector = Arc::clone(&self.detector);
        let tx = self.events_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let upload = ImageUpload::new(shot.jpeg, candidate::POLL_FRAME_NAME);
            let outcome = detector.submit(upload).await;
            let _ = tx.send(MachineEvent::Detection { run, outcome });
        });
    }

    fn on_detection(&mut self, run: PollHandle, outcome: DetectionOutcome) {
        if !self.is_live_run(run) {
            debug!(%run, state = %self.state, "Discarding stale detection outcome");
            self.stats.record_stale();
            return;
        }

        match outcome {
            DetectionOutcome::Detected(crop) => {
                info!(%run, bytes = crop.len(), "Document detected automatically");
                self.stats.record_detected();
                self.candidate = Some(CandidateImage::auto_detected(crop, Local::now()));
                self.teardown();
                self.transition(CaptureState::CandidateReady);
            }
            DetectionOutcome::NotDetected => {
                debug!(%run, "No document in frame");
                self.stats.record_not_detected();
            }
            DetectionOutcome::TransportError(e) => {
                warn!(%run, "Error processing the frame: {e}");
                self.stats.record_transport_error();
            }
        }
    }

    /// Stop polling, then the camera.
    fn teardown(&mut self) {
        self.poller.cancel();
        self.camera.stop();
    }

    /// Move to the state implied by the candidate alone.
    fn settle(&mut self) {
        let next = match &self.candidate {
            None => CaptureState::Idle,
            Some(c) if c.is_crop() || c.provenance() != Provenance::UserSelected => {
                CaptureState::CandidateReady
            }
            Some(_) => CaptureState::FileSelected,
        };
        self.transition(next);
    }

    fn transition(&mut self, next: CaptureState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "Capture state change");
            self.state = next;
        }
    }
}
