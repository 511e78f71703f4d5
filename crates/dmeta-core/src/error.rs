//! Error types and handling for dmeta-core operations.
//!
//! One error enum covers every failure mode in the crate. Errors carry a
//! category string for logging and a recoverability hint for callers that
//! want to retry transient failures.

use thiserror::Error;

/// The main error type for dmeta-core operations.
///
/// All public functions in dmeta-core return `Result<T, Error>`. Underlying
/// I/O and HTTP errors are preserved so the full source chain stays
/// inspectable.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed (reading source files, writing the store, ...).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed while fetching a source archive.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A downloaded payload could not be unpacked as a zip archive.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Content could not be interpreted (malformed UTF-8 boundaries etc.).
    ///
    /// Note that malformed meta *blocks* never produce this error; the block
    /// parser degrades to partial records instead.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Flat-file store operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// URL is malformed or invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Returns `true` for failures that are typically temporary: network
    /// timeouts, connection resets and interrupted I/O. Parse, config and
    /// storage errors are permanent.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a static string identifier.
    ///
    /// Useful for grouping errors in logs and metrics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Archive(_) => "archive",
            Self::Parse(_) => "parse",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
