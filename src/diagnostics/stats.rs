use serde::Serialize;
use std::time::{Duration, Instant};

/// Counters for one auto-detect run.
pub struct DetectionStats {
    ticks: u64,
    frames_submitted: u64,
    not_detected: u64,
    transport_errors: u64,
    capture_misses: u64,
    stale_outcomes: u64,
    bytes_submitted: u64,
    start_time: Instant,
    detected_after: Option<Duration>,
}

/// Snapshot of detection stats for display and serialisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSnapshot {
    pub ticks: u64,
    pub frames_submitted: u64,
    pub not_detected: u64,
    pub transport_errors: u64,
    pub capture_misses: u64,
    pub stale_outcomes: u64,
    pub bytes_submitted: u64,
    pub miss_rate: f64,
    pub detected_after_ms: Option<u64>,
}

impl DetectionStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            ticks: 0,
            frames_submitted: 0,
            not_detected: 0,
            transport_errors: 0,
            capture_misses: 0,
            stale_outcomes: 0,
            bytes_submitted: 0,
            start_time: Instant::now(),
            detected_after: None,
        }
    }

    pub fn record_tick(&mut self) {
        self.ticks += 1;
    }

    /// A tick found no frame to capture.
    pub fn record_capture_miss(&mut self) {
        self.capture_misses += 1;
    }

    pub fn record_submission(&mut self, bytes: usize) {
        self.frames_submitted += 1;
        self.bytes_submitted += bytes as u64;
    }

    pub fn record_not_detected(&mut self) {
        self.not_detected += 1;
    }

    pub fn record_transport_error(&mut self) {
        self.transport_errors += 1;
    }

    /// An outcome arrived after its polling run had ended.
    pub fn record_stale(&mut self) {
        self.stale_outcomes += 1;
    }

    pub fn record_detected(&mut self) {
        self.detected_after = Some(self.start_time.elapsed());
    }

    /// Share of answered submissions that did not yield a document, as a
    /// percentage (0.0 - 100.0).
    pub fn miss_rate(&self) -> f64 {
        let misses = self.not_detected + self.transport_errors;
        let answered = misses + u64::from(self.detected_after.is_some());
        if answered == 0 {
            return 0.0;
        }
        (misses as f64 / answered as f64) * 100.0
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> DetectionSnapshot {
        DetectionSnapshot {
            ticks: self.ticks,
            frames_submitted: self.frames_submitted,
            not_detected: self.not_detected,
            transport_errors: self.transport_errors,
            capture_misses: self.capture_misses,
            stale_outcomes: self.stale_outcomes,
            bytes_submitted: self.bytes_submitted,
            miss_rate: self.miss_rate(),
            detected_after_ms: self.detected_after.map(|d| d.as_millis() as u64),
        }
    }
}

impl Default for DetectionStats {
    fn default() -> Self {
        Self::new()
    }
}
