use thiserror::Error;

/// Error surfaced by the media server and catalog manager clients
#[derive(Debug, Error)]
pub enum SourceError {
    /// The remote service answered but has no such item/tag
    #[error("{0} not found")]
    NotFound(String),

    /// The service could not be reached (bad URL, DNS, refused connection)
    #[error("connection failed: {0}")]
    Connection(String),

    /// Credentials were rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Other(anyhow::anyhow!(message.into()))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_builder() {
            SourceError::Connection(e.to_string())
        } else if e.status() == Some(reqwest::StatusCode::UNAUTHORIZED) {
            SourceError::Unauthorized(e.to_string())
        } else {
            SourceError::Other(e.into())
        }
    }
}
