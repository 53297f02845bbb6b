//! Core error types for Quotascope.

use chrono::NaiveDate;
use thiserror::Error;

/// Core error type for Quotascope operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The report period is inverted (start after end).
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// Requested period start.
        start: NaiveDate,
        /// Requested period end.
        end: NaiveDate,
    },

    /// A bearer token could not be obtained.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// An outbound call to a collaborator failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid data from an API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
