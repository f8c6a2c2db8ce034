//! Error types for the 7plus client

/// Result type alias for 7plus operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the 7plus client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Endpoint answered with a non-success status
    #[error("API returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// Playback negotiation refused, with the upstream `error_code`
    #[error("API error: {code}")]
    Api { code: String },

    /// Response is missing a field the client relies on
    #[error("Unexpected response: missing {0}")]
    MissingField(&'static str),

    /// The media descriptor has no source the player can open
    #[error("No playable source in media descriptor")]
    NoPlayableSource,

    /// Configuration error (from tvconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an API error from an upstream error code
    pub fn api(code: impl Into<String>) -> Self {
        Self::Api { code: code.into() }
    }

    /// Upstream error code, for negotiation failures
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code } => Some(code),
            _ => None,
        }
    }
}

impl From<Error> for tvsource::SourceError {
    fn from(err: Error) -> Self {
        match err {
            Error::Api { code } => tvsource::SourceError::Api { code },
            Error::Http(e) => tvsource::SourceError::Unavailable(e.to_string()),
            Error::Status { status, url } => {
                tvsource::SourceError::Unavailable(format!("{} returned {}", url, status))
            }
            other => tvsource::SourceError::Other(other.to_string()),
        }
    }
}
