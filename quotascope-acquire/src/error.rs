//! Acquisition error types.

use thiserror::Error;

use quotascope_core::CoreError;

/// Error type for acquisition operations.
///
/// Individual source failures are not surfaced to the caller; the pipeline
/// records them as attempts and advances the cascade. Only
/// [`AcquireError::AllSourcesFailed`] escapes a pipeline execution.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// An outbound transport call failed.
    #[error("Transport error: {0}")]
    Transport(#[from] CoreError),

    /// A source answered, but the result cannot drive aggregation.
    #[error("Source returned an unusable result")]
    UnusableResult,

    /// A record could not be mapped into the canonical row schema.
    #[error("Malformed usage record: {0}")]
    MalformedRecord(String),

    /// Every source in the cascade failed.
    #[error("All usage sources failed")]
    AllSourcesFailed,
}
