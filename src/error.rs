//! Error types for component scripts.

use thiserror::Error;

use crate::bridge::ScriptError;

/// Component scripts error type.
///
/// Cloneable so that a failed import can be replayed to every caller that
/// awaits the same module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No formatter or entry unit could be resolved
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The script bridge reported a failure
    #[error("Script error: {0}")]
    Bridge(#[from] ScriptError),

    /// Argument or result (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error while reading configuration
    #[error("IO error: {0}")]
    Io(String),

    /// The proxy was disposed and its module released
    #[error("Module already disposed")]
    Disposed,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result type alias for component script operations.
pub type Result<T> = std::result::Result<T, Error>;
