// Still capture: turning the live frame into an uploadable JPEG.

pub mod compress;
pub mod snapshot;

pub use snapshot::{FrameCapture, Snapshot};
