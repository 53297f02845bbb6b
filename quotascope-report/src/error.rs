//! Report error types.

use thiserror::Error;

/// Error type for report configuration and output operations.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Quota file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Quota file could not be parsed.
    #[error("Quota configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
