//! Error types for lorelink.

use thiserror::Error;

/// Result type alias using lorelink's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lorelink operations.
///
/// The resolution pipeline itself never returns these; they surface from
/// configuration loading and input parsing at the edges.
#[derive(Error, Debug)]
pub enum Error {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Why a lookup produced no candidates even though the service was asked.
///
/// These never propagate to callers of the pipeline. A lookup that fails
/// this way yields an empty candidate list and the failure is recorded
/// alongside it so the resolver can log and tag the degraded result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// Network error, timeout, or connection refused.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("lookup service returned HTTP {0}")]
    Status(u16),

    /// The body was not JSON or violated the response schema.
    #[error("malformed lookup response: {0}")]
    Format(String),
}
