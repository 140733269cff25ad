//! Building log records from request/response pairs.

use logger_core::{HttpRequest, HttpResponse, LogRecord};
use std::time::Duration;

/// Per-call options for [`HttpLogger::log`](crate::HttpLogger::log).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Response body to log instead of the one the adapter captured
    pub response_body: Option<String>,
    /// Request body to log instead of the one the adapter captured
    pub request_body: Option<String>,
    /// Timestamp in epoch milliseconds. Defaults to the current time.
    pub now: Option<i64>,
    /// Time spent serving the request
    pub interval: Option<Duration>,
}

impl LogOptions {
    /// Create empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the response body
    #[must_use]
    pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    /// Override the request body
    #[must_use]
    pub fn with_request_body(mut self, body: impl Into<String>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    /// Set the timestamp
    #[must_use]
    pub fn with_now(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }

    /// Set the elapsed time
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }
}

/// Converts adapter output into a [`LogRecord`].
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a record in fixed field order.
    ///
    /// Header and parameter names are lowercased and duplicates are kept.
    /// Body overrides win over the adapter's bodies, even when empty. Missing
    /// or empty values are left out.
    pub fn build<Q, S>(
        request: &Q,
        response: &S,
        response_body: Option<&str>,
        request_body: Option<&str>,
    ) -> LogRecord
    where
        Q: HttpRequest + ?Sized,
        S: HttpResponse + ?Sized,
    {
        let mut record = LogRecord::new();
        record.push_present("request_method", request.method());
        record.push_present("request_url", request.url());
        record.push_present(
            "response_code",
            response.status().map(|s| s.to_string()).as_deref(),
        );
        for (name, value) in request.headers() {
            record.push_present(format!("request_header:{}", name.to_lowercase()), Some(value.as_str()));
        }
        for (name, value) in request.params() {
            record.push_present(format!("request_param:{}", name.to_lowercase()), Some(value.as_str()));
        }
        for (name, value) in response.headers() {
            record.push_present(format!("response_header:{}", name.to_lowercase()), Some(value.as_str()));
        }
        record.push_present("request_body", request_body.or_else(|| request.body()));
        record.push_present("response_body", response_body.or_else(|| response.body()));
        record
    }
}
