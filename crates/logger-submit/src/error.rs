//! Submission error types.

use thiserror::Error;

/// Result type for submission operations.
pub type Result<T> = std::result::Result<T, SubmitError>;

/// Errors raised inside the submission pipeline.
///
/// Only construction errors reach callers. Everything that happens after a
/// record is handed over is counted as a failure and logged.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The pipeline could not be set up.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// The POST could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The collector answered with something other than 204.
    #[error("Unexpected response status: {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The batch could not be compressed.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The dispatch queue had no room for the record.
    #[error("Submission queue is full")]
    QueueFull,

    /// The dispatcher has shut down.
    #[error("Dispatcher is closed")]
    Closed,
}

impl SubmitError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
