//! Logger configuration.

use crate::usage_loggers::UsageLoggers;
use logger_submit::{MessageQueue, SubmitConfig};

/// Configuration for an [`HttpLogger`](crate::HttpLogger).
///
/// Unset `rules` select the process-wide default rules. Unset `url` falls
/// back to `USAGE_LOGGERS_URL`. A `queue` takes precedence over any URL.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Start enabled
    pub enabled: bool,
    /// In-memory destination
    pub queue: Option<MessageQueue>,
    /// Collector URL
    pub url: Option<String>,
    /// Rule text, or `file://<path>`
    pub rules: Option<String>,
    /// GraphQL schema text, or `file://<path>`
    pub schema: Option<String>,
    /// Send batches uncompressed
    pub skip_compression: bool,
    /// Build records but never submit them
    pub skip_submission: bool,
    /// Submission pipeline settings
    pub submit: SubmitConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue: None,
            url: None,
            rules: None,
            schema: None,
            skip_compression: false,
            skip_submission: false,
            submit: SubmitConfig::default(),
        }
    }
}

impl LoggerConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from `USAGE_LOGGERS_URL` and `USAGE_LOGGERS_DEBUG`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            url: UsageLoggers::url_by_default(),
            submit: SubmitConfig::default().with_synchronous(UsageLoggers::is_debug()),
            ..Self::default()
        }
    }

    /// Set whether the logger starts enabled
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Log to an in-memory queue
    #[must_use]
    pub fn with_queue(mut self, queue: MessageQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Set the collector URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the rules
    #[must_use]
    pub fn with_rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    /// Set the GraphQL schema
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set whether batches are sent uncompressed
    #[must_use]
    pub fn with_skip_compression(mut self, skip: bool) -> Self {
        self.skip_compression = skip;
        self
    }

    /// Set whether submission is skipped
    #[must_use]
    pub fn with_skip_submission(mut self, skip: bool) -> Self {
        self.skip_submission = skip;
        self
    }

    /// Set synchronous dispatch
    #[must_use]
    pub fn with_synchronous(mut self, synchronous: bool) -> Self {
        self.submit.synchronous = synchronous;
        self
    }

    /// Set the submission pipeline settings
    #[must_use]
    pub fn with_submit_config(mut self, submit: SubmitConfig) -> Self {
        self.submit = submit;
        self
    }
}
