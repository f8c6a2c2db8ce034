//! Error types for the Stirr source

/// Result type alias for Stirr operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the Stirr source
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed endpoint answered with a non-success status
    #[error("Feed returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// Decompression or file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No channel with this id in the feed
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// The source is turned off in configuration
    #[error("Stirr is disabled in configuration")]
    Disabled,

    /// Configuration or user-state error (from tvconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl From<Error> for tvsource::SourceError {
    fn from(err: Error) -> Self {
        match err {
            Error::ChannelNotFound(id) => tvsource::SourceError::NotFound(id),
            Error::Disabled => tvsource::SourceError::Unavailable(Error::Disabled.to_string()),
            Error::Http(e) => tvsource::SourceError::Unavailable(e.to_string()),
            Error::Status { status, url } => {
                tvsource::SourceError::Unavailable(format!("{} returned {}", url, status))
            }
            other => tvsource::SourceError::Other(other.to_string()),
        }
    }
}
