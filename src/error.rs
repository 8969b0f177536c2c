//! Error types for the showcase controller and the generation proxy

use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the showcase controller or the proxy
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// An event referenced an item that is not in the catalog
    #[error("Index {index} is out of range for a catalog of {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// The controller has been torn down and no longer accepts events
    #[error("Showcase controller is detached")]
    Detached,

    /// Transport-level failure talking to a remote service
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The upstream service answered, but not with something we can relay
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// Failure binding or running the HTTP server
    #[error("Server error: {0}")]
    ServerError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", err))
    }
}

#[cfg(feature = "proxy")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // The upstream URL carries the credential as a query parameter.
        Error::NetworkError(err.without_url().to_string())
    }
}
