use docdetect_wire::WireError;
use thiserror::Error;

/// Failure to get a usable answer out of the detection service.
///
/// Distinct from a well-formed "no document" answer, which is a
/// [`DetectionOutcome::NotDetected`](super::DetectionOutcome::NotDetected).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request could not be built: {0}")]
    Request(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("detection service answered with HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    MalformedBody(#[from] WireError),
}
