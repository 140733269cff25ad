//! Rule error types.

/// Result type for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Errors raised while loading or parsing rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Malformed rule text.
    #[error("{message}")]
    Syntax {
        /// Error message naming the offending rule.
        message: String,
    },

    /// Rule file could not be read.
    #[error("Failed to load rules: {path}")]
    FileNotFound {
        /// Path as written after the `file://` prefix.
        path: String,
    },
}

impl RuleError {
    /// Create a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Create a file-not-found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Check if this is a syntax error.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}
