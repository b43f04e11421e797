//! Error types for the bookmark reporter

use thiserror::Error;

/// Result type alias for reporter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reporter error types
///
/// Suppression and server-reported business conditions are not errors; they
/// travel as outcomes so callers can pattern-match "no event" apart from
/// "failed event".
#[derive(Error, Debug)]
pub enum Error {
    /// A live position read was required but no player handle exists.
    /// Reporting a stale or zero time would corrupt analytics, so the
    /// whole build aborts.
    #[error("no player available to read the current position")]
    NoPlayerAvailable,

    /// The request-builder collaborator refused the resolved parameters
    /// (malformed endpoint, unserializable body).
    #[error("bookmark request refused: {reason}")]
    RequestBuildFailed { reason: String },
}

impl Error {
    /// Returns the error code for logging/analytics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::NoPlayerAvailable => "NO_PLAYER",
            Error::RequestBuildFailed { .. } => "REQUEST_BUILD",
        }
    }
}
