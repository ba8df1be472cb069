// Settings: persisted service and capture configuration.

pub mod store;
pub mod types;

pub use types::{CaptureSettings, ServiceSettings, Settings};
