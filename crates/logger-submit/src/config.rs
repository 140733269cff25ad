//! Submission pipeline configuration.

use std::time::Duration;

/// Configuration for a [`Submitter`](crate::Submitter).
#[derive(Debug, Clone)]
pub struct SubmitConfig {
    /// Records that may wait for the dispatcher. Submissions beyond this are
    /// dropped and counted as failures.
    pub max_queue_depth: usize,
    /// Most records sent in one POST.
    pub max_batch_size: usize,
    /// Whole-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
    /// Connection timeout. `None` keeps the transport default.
    pub connect_timeout: Option<Duration>,
    /// `User-Agent` header sent with every batch.
    pub user_agent: String,
    /// Wait for each submission to be dispatched before returning.
    pub synchronous: bool,
}

impl SubmitConfig {
    /// Default queue depth.
    pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 128;
    /// Default batch size.
    pub const DEFAULT_MAX_BATCH_SIZE: usize = 128;
    /// Default user agent.
    pub const DEFAULT_USER_AGENT: &'static str =
        concat!("usage-logger-rs/", env!("CARGO_PKG_VERSION"));

    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the queue depth. Zero is raised to one.
    #[must_use]
    pub fn with_max_queue_depth(mut self, depth: usize) -> Self {
        self.max_queue_depth = depth.max(1);
        self
    }

    /// Set the batch size. Zero is raised to one.
    #[must_use]
    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size.max(1);
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set synchronous dispatch.
    #[must_use]
    pub fn with_synchronous(mut self, synchronous: bool) -> Self {
        self.synchronous = synchronous;
        self
    }
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            max_queue_depth: Self::DEFAULT_MAX_QUEUE_DEPTH,
            max_batch_size: Self::DEFAULT_MAX_BATCH_SIZE,
            timeout: None,
            connect_timeout: None,
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
            synchronous: false,
        }
    }
}
