// Diagnostics: auto-detect run statistics.

pub mod stats;

pub use stats::{DetectionSnapshot, DetectionStats};
