//! Recoverable failures of the per-descriptor stages.
//!
//! None of these abort a run; the pipeline logs them and moves on to the
//! next descriptor.

use thiserror::Error;

/// A request that never produced a usable response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Network(String),
}

/// Why one search strategy produced no candidate.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Why a download did not end with a stored photo.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("not an image: {0}")]
    NotAnImage(String),

    #[error("payload too small ({size} bytes, minimum {min})")]
    TooSmall { size: u64, min: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
