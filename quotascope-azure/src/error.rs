//! Azure transport error types.

use thiserror::Error;

use quotascope_core::CoreError;

/// Error type for ARM transport operations.
#[derive(Debug, Error)]
pub enum AzureError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<AzureError> for CoreError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::Auth(msg) => CoreError::AuthenticationFailed(msg),
            AzureError::Api { status, body } if status == 401 || status == 403 => {
                CoreError::AuthenticationFailed(format!("{status}: {body}"))
            }
            AzureError::Json(e) => CoreError::InvalidData(e.to_string()),
            AzureError::InvalidResponse(msg) => CoreError::InvalidData(msg),
            other => CoreError::Transport(other.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
