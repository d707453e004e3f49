use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("Rate limited by {provider}, retry after {retry_after_seconds}s")]
    RateLimited {
        provider: String,
        retry_after_seconds: u64,
    },

    #[error("Failed to parse response: {0}")]
    JsonParse(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

impl MetadataError {
    /// Whether retrying the same lookup later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            MetadataError::NetworkError(_) | MetadataError::RateLimited { .. } => true,
            MetadataError::HttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MetadataError>;
