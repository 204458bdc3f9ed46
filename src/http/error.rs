use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Request to {url} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<HttpError>,
    },

    #[error("Invalid HTTP configuration: {0}")]
    Config(String),
}

impl HttpError {
    /// Status code of the response that caused the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            HttpError::RetriesExhausted { source, .. } => source.status(),
            _ => None,
        }
    }
}
