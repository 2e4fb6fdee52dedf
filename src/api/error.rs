//! API Client Error Types
//!
//! Errors raised while talking to the COVID-19 data API. The dashboard turns
//! these into a user-visible message; they never reach the metrics engine.

use thiserror::Error;

/// Errors that can occur when communicating with the data API
#[derive(Error, Debug)]
pub enum ClientError {
    /// Could not connect to the API
    #[error("API unavailable")]
    Unavailable,

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Requested region or date does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success status from the API
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Unavailable | ClientError::Timeout => true,
            ClientError::Api { status, .. } => *status == 429 || *status == 503,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Unavailable
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Request(err)
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
