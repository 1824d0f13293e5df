//! Error types for LYTAF filtering

use thiserror::Error;

/// Result type alias for LYTAF operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for LYTAF operations
#[derive(Error, Debug)]
pub enum Error {
    /// Selector entry that is neither an event-type name nor an integer code
    #[error("Invalid selector type: {0}")]
    InvalidSelectorType(String),

    /// Channel or data array whose shape does not line up with the time axis
    #[error("Channel shape error: {0}")]
    ChannelShape(String),

    /// Unknown artifact name, out-of-range code, or missing selector
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Annotation source outside the known categories
    #[error("Unknown LYTAF source '{0}', expected one of lyra, manual, ppt, science")]
    UnknownSource(String),

    /// Annotation source could not be loaded or fetched
    #[error("Source not available: {0}")]
    NotAvailable(String),

    /// Invalid timestamp or time range
    #[error("Temporal error: {0}")]
    Temporal(String),

    /// Annotation file errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// CSV export layout errors
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Export(e.to_string())
    }
}
