// Detection service client and its HTTP transport.

pub mod client;
pub mod error;
pub mod http;

pub use client::{DetectionOutcome, DetectionService, ImageUpload};
pub use error::TransportError;
pub use http::HttpDetectionClient;
