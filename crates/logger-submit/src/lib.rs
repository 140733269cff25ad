//! # Logger Submit
//!
//! Delivery of usage log records.
//!
//! A [`Submitter`] either appends messages to an in-memory [`MessageQueue`]
//! or hands them to a background dispatcher that batches them into
//! newline-delimited JSON, optionally deflates the batch, and POSTs it to a
//! collector. A `204 No Content` answer counts every record in the batch as a
//! success; anything else counts them as failures. Failures are never retried
//! and never reported to the caller.
//!
//! ```rust,no_run
//! use logger_submit::{Destination, SubmitConfig, Submitter};
//! use url::Url;
//!
//! let url = Url::parse("https://collector.example/message").unwrap();
//! let submitter = Submitter::new(Destination::Url(url), SubmitConfig::default()).unwrap();
//! submitter.submit("[[\"request_method\",\"GET\"]]", true);
//! submitter.flush();
//! println!("{} delivered", submitter.successes());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod config;
pub mod counters;
pub mod destination;
mod dispatcher;
pub mod error;

pub use batch::SubmissionItem;
pub use config::SubmitConfig;
pub use counters::SubmitCounters;
pub use destination::{Destination, MessageQueue};
pub use error::{Result, SubmitError};

use dispatcher::Dispatcher;
use logger_core::LogRecord;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Sends messages to a destination and counts the outcomes.
pub struct Submitter {
    destination: Destination,
    counters: Arc<SubmitCounters>,
    dispatcher: RwLock<Option<Dispatcher>>,
    synchronous: bool,
}

impl Submitter {
    /// Create a submitter. A dispatcher is started for URL destinations.
    pub fn new(destination: Destination, config: SubmitConfig) -> Result<Self> {
        let counters = Arc::new(SubmitCounters::new());
        let dispatcher = match &destination {
            Destination::Url(url) => Some(Dispatcher::start(url.clone(), &config, Arc::clone(&counters))?),
            Destination::Queue(_) => None,
        };
        Ok(Self {
            destination,
            counters,
            dispatcher: RwLock::new(dispatcher),
            synchronous: config.synchronous,
        })
    }

    /// Destination of this submitter.
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Submit one serialized message.
    ///
    /// Queue destinations count the message immediately. URL destinations
    /// return as soon as the message is queued for the dispatcher, unless the
    /// submitter is synchronous. When the dispatcher queue is full the message
    /// is dropped and counted as a failure.
    pub fn submit(&self, message: impl Into<String>, compress: bool) {
        let message = message.into();
        if let Destination::Queue(queue) = &self.destination {
            queue.push(message);
            self.counters.record_successes(1);
            return;
        }

        let guard = self.dispatcher.read();
        let Some(dispatcher) = guard.as_ref() else {
            warn!("Submission after shutdown");
            self.counters.record_failures(1);
            return;
        };
        match dispatcher.enqueue(SubmissionItem::new(message, compress)) {
            Ok(()) => {}
            Err(SubmitError::QueueFull) => {
                debug!("Submission queue full, dropping message");
                self.counters.record_failures(1);
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to queue submission");
                self.counters.record_failures(1);
                return;
            }
        }
        if self.synchronous {
            if let Err(e) = dispatcher.flush() {
                warn!(error = %e, "Failed to wait for submission");
            }
        }
    }

    /// Serialize and submit a record.
    pub fn submit_record(&self, record: &LogRecord, compress: bool) {
        match record.to_json() {
            Ok(message) => self.submit(message, compress),
            Err(e) => {
                let e = SubmitError::from(e);
                warn!(error = %e, "Failed to serialize record");
                self.counters.record_failures(1);
            }
        }
    }

    /// Wait until every message submitted so far has been counted.
    pub fn flush(&self) {
        if let Some(dispatcher) = self.dispatcher.read().as_ref() {
            if let Err(e) = dispatcher.flush() {
                warn!(error = %e, "Failed to flush submissions");
            }
        }
    }

    /// Deliver queued messages and stop the dispatcher.
    ///
    /// Later submissions to a URL destination are counted as failures.
    pub fn shutdown(&self) {
        let dispatcher = self.dispatcher.write().take();
        if let Some(mut dispatcher) = dispatcher {
            dispatcher.shutdown();
        }
    }

    /// Delivered messages so far.
    pub fn successes(&self) -> u64 {
        self.counters.successes()
    }

    /// Lost messages so far.
    pub fn failures(&self) -> u64 {
        self.counters.failures()
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("destination", &self.destination)
            .field("successes", &self.successes())
            .field("failures", &self.failures())
            .field("synchronous", &self.synchronous)
            .finish()
    }
}
