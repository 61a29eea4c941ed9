use crate::config::ConfigError;
use crate::halt::Halt;
use crate::json::JsonError;
use thiserror::Error;

/// Top-level error type for the dragon-web library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("json error: {0}")]
    Json(#[from] JsonError),

    #[error("application context requires an inbound request")]
    MissingRequest,

    #[error("application context has not been initialized")]
    NotInitialized,

    #[error("application context is already initialized")]
    AlreadyInitialized,

    /// Processing must stop and the carried response be written instead.
    #[error("halted with status {}", .0.status())]
    Halt(Halt),
}

impl Error {
    /// Returns `true` if this is a terminal [`Halt`] rather than a failure.
    pub fn is_halt(&self) -> bool {
        matches!(self, Error::Halt(_))
    }

    /// Extracts the terminal response, if any.
    pub fn into_halt(self) -> Option<Halt> {
        match self {
            Error::Halt(halt) => Some(halt),
            _ => None,
        }
    }
}

impl From<Halt> for Error {
    fn from(halt: Halt) -> Self {
        Error::Halt(halt)
    }
}
