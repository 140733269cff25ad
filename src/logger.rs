//! The HTTP usage logger.

use crate::config::LoggerConfig;
use crate::error::{Error, Result};
use crate::message::{LogOptions, MessageBuilder};
use crate::usage_loggers::UsageLoggers;
use logger_core::{HttpRequest, HttpResponse, LogRecord};
use logger_rules::HttpRules;
use logger_submit::{Destination, MessageQueue, Submitter};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, warn};
use url::Url;

/// Agent name reported with every schema announcement.
pub const AGENT: &str = "http_logger.rs";

/// Version reported with every schema announcement.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const FILE_PREFIX: &str = "file://";

/// Usage logger for HTTP request/response pairs.
///
/// Each logger owns its rules, its destination and its submission counters.
/// Construction fails only on bad rules or an unreadable schema; a bad
/// destination produces a logger that stays disabled.
///
/// ```rust,no_run
/// use usage_logger::{HttpLogger, HttpRequestImpl, HttpResponseImpl, LogOptions, LoggerConfig};
///
/// let logger = HttpLogger::new(
///     LoggerConfig::new()
///         .with_url("https://collector.example/message")
///         .with_rules("include standard"),
/// )
/// .unwrap();
///
/// let request = HttpRequestImpl::new().with_method("GET").with_url("https://shop.example/cart");
/// let response = HttpResponseImpl::new().with_status(200);
/// logger.log(&request, &response, LogOptions::new());
/// ```
#[derive(Debug)]
pub struct HttpLogger {
    enabled: AtomicBool,
    enableable: bool,
    host: String,
    queue: Option<MessageQueue>,
    url: Option<String>,
    rules: HttpRules,
    schema: Option<String>,
    skip_compression: bool,
    skip_submission: bool,
    submitter: Option<Submitter>,
}

impl HttpLogger {
    /// Create a logger.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        let rules = HttpRules::new(config.rules.as_deref())?;
        let schema = load_schema(config.schema.as_deref())?;

        let (destination, url) = match config.queue {
            Some(queue) => (Some(Destination::Queue(queue)), None),
            None => match config.url.or_else(UsageLoggers::url_by_default) {
                Some(raw) => match parse_destination(&raw) {
                    Some(parsed) => (Some(Destination::Url(parsed)), Some(raw)),
                    None => {
                        warn!(url = %raw, "Invalid destination URL, logger disabled");
                        (None, None)
                    }
                },
                None => (None, None),
            },
        };

        let mut enableable = destination.is_some();
        let plain_http = destination
            .as_ref()
            .and_then(Destination::url)
            .is_some_and(|u| u.scheme() == "http");
        if plain_http && !rules.allow_http_url() {
            warn!("Plain http destination requires allow_http_url, logger disabled");
            enableable = false;
        }

        let mut submit = config.submit;
        submit.synchronous |= UsageLoggers::is_debug();
        let submitter = match destination {
            Some(destination) if enableable => match Submitter::new(destination, submit) {
                Ok(submitter) => Some(submitter),
                Err(e) => {
                    error!(error = %e, "Failed to start submission, logger disabled");
                    enableable = false;
                    None
                }
            },
            _ => None,
        };

        let logger = Self {
            enabled: AtomicBool::new(config.enabled && enableable),
            enableable,
            host: host_lookup(),
            queue: submitter
                .as_ref()
                .and_then(|s| s.destination().queue().cloned()),
            url,
            skip_compression: config.skip_compression || rules.skip_compression(),
            skip_submission: config.skip_submission || rules.skip_submission(),
            rules,
            schema,
            submitter,
        };
        debug!(
            enabled = logger.enabled(),
            enableable = logger.enableable,
            rule_count = logger.rules.len(),
            "Logger created"
        );

        if logger.enabled() {
            if let Some(schema) = &logger.schema {
                logger.submit_record(&logger.schema_record(schema));
            }
        }
        Ok(logger)
    }

    /// Agent name.
    pub fn agent(&self) -> &'static str {
        AGENT
    }

    /// Crate version.
    pub fn version(&self) -> &'static str {
        VERSION
    }

    /// Host name reported with each record.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether the logger could ever be enabled.
    pub fn enableable(&self) -> bool {
        self.enableable
    }

    /// Whether the logger and the process-wide switch are both on.
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire) && UsageLoggers::is_enabled()
    }

    /// Turn the logger on, if it has a usable destination.
    pub fn enable(&self) -> &Self {
        if self.enableable {
            self.enabled.store(true, Ordering::Release);
        }
        self
    }

    /// Turn the logger off.
    pub fn disable(&self) -> &Self {
        self.enabled.store(false, Ordering::Release);
        self
    }

    /// In-memory destination, if any.
    pub fn queue(&self) -> Option<&MessageQueue> {
        self.queue.as_ref()
    }

    /// Collector URL as configured, if valid.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Parsed rules.
    pub fn rules(&self) -> &HttpRules {
        &self.rules
    }

    /// Loaded GraphQL schema.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Whether batches are sent uncompressed.
    pub fn skip_compression(&self) -> bool {
        self.skip_compression
    }

    /// Whether submission is skipped.
    pub fn skip_submission(&self) -> bool {
        self.skip_submission
    }

    /// Delivered messages so far.
    pub fn submit_successes(&self) -> u64 {
        self.submitter.as_ref().map_or(0, Submitter::successes)
    }

    /// Lost messages so far.
    pub fn submit_failures(&self) -> u64 {
        self.submitter.as_ref().map_or(0, Submitter::failures)
    }

    /// Log one request/response pair.
    ///
    /// Never fails and never waits on the network, unless the logger was
    /// configured for synchronous dispatch.
    pub fn log<Q, S>(&self, request: &Q, response: &S, options: LogOptions)
    where
        Q: HttpRequest + ?Sized,
        S: HttpResponse + ?Sized,
    {
        if !self.enabled() {
            return;
        }
        if let Some(record) = self.format(request, response, &options) {
            self.submit_record(&record);
        }
    }

    /// Build the record that [`log`](Self::log) would submit.
    ///
    /// Returns `None` when the rules drop the record.
    pub fn format<Q, S>(&self, request: &Q, response: &S, options: &LogOptions) -> Option<LogRecord>
    where
        Q: HttpRequest + ?Sized,
        S: HttpResponse + ?Sized,
    {
        let mut record = MessageBuilder::build(
            request,
            response,
            options.response_body.as_deref(),
            options.request_body.as_deref(),
        );
        self.copy_session_fields(request, &mut record);

        let mut record = self.rules.apply(record)?;
        let now = options
            .now
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        record.push("now", now.to_string());
        if let Some(interval) = options.interval {
            record.push("interval", interval.as_millis().to_string());
        }
        record.push("host", self.host.clone());
        Some(record)
    }

    /// Submit a serialized message as is.
    pub fn submit(&self, message: impl Into<String>) {
        if let Some(submitter) = self.active_submitter() {
            submitter.submit(message, !self.skip_compression);
        }
    }

    fn submit_record(&self, record: &LogRecord) {
        if let Some(submitter) = self.active_submitter() {
            submitter.submit_record(record, !self.skip_compression);
        }
    }

    fn active_submitter(&self) -> Option<&Submitter> {
        if self.skip_submission || !self.enabled() {
            return None;
        }
        self.submitter.as_ref()
    }

    /// Block until everything submitted so far has been counted.
    pub fn wait_for_response(&self) {
        if let Some(submitter) = &self.submitter {
            submitter.flush();
        }
    }

    /// Deliver pending messages and stop the dispatcher.
    pub fn shutdown(&self) {
        if let Some(submitter) = &self.submitter {
            submitter.shutdown();
        }
    }

    fn copy_session_fields<Q>(&self, request: &Q, record: &mut LogRecord)
    where
        Q: HttpRequest + ?Sized,
    {
        let rules = self.rules.copy_session_field();
        if rules.is_empty() {
            return;
        }
        let session = request.session();
        for rule in rules {
            let Some(pattern) = rule.pattern() else {
                continue;
            };
            for (name, value) in &session {
                if pattern.is_match(name) {
                    record.push_present(format!("session_field:{name}"), Some(value.as_str()));
                }
            }
        }
    }

    fn schema_record(&self, schema: &str) -> LogRecord {
        let mut record = LogRecord::with_capacity(5);
        record.push("graphql_schema", schema);
        record.push("agent", AGENT);
        record.push("version", VERSION);
        record.push("host", self.host.clone());
        record.push("now", chrono::Utc::now().timestamp_millis().to_string());
        record
    }
}

fn parse_destination(raw: &str) -> Option<Url> {
    Url::parse(raw)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn load_schema(schema: Option<&str>) -> Result<Option<String>> {
    let Some(schema) = schema else {
        return Ok(None);
    };
    match schema.strip_prefix(FILE_PREFIX) {
        Some(path) => {
            let path = path.trim();
            std::fs::read_to_string(path)
                .map(Some)
                .map_err(|_| Error::schema_not_found(path))
        }
        None => Ok(Some(schema.to_string())),
    }
}

fn host_lookup() -> String {
    if let Ok(dyno) = std::env::var("DYNO") {
        return dyno;
    }
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}
