//! Error types for the usage logger.

use logger_rules::RuleError;
use logger_submit::SubmitError;
use thiserror::Error;

/// Result type for logger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a logger.
///
/// Logging itself never fails: delivery problems only show up in the
/// submission counters.
#[derive(Error, Debug)]
pub enum Error {
    /// Rule text could not be loaded or parsed.
    #[error(transparent)]
    Rules(#[from] RuleError),

    /// Schema file could not be read.
    #[error("Failed to load schema: {path}")]
    SchemaNotFound {
        /// Path as written after the `file://` prefix.
        path: String,
    },

    /// Submission pipeline could not be started.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

impl Error {
    /// Create a schema-not-found error.
    pub fn schema_not_found(path: impl Into<String>) -> Self {
        Self::SchemaNotFound { path: path.into() }
    }

    /// Check if this error came from the rules.
    pub fn is_rules(&self) -> bool {
        matches!(self, Self::Rules(_))
    }
}
