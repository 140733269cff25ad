//! Background dispatcher.
//!
//! Each network submitter owns one dispatcher: a bounded tokio channel and a
//! worker thread. The worker drains the channel into batches, POSTs each batch
//! and updates the shared counters. It runs its own single-threaded tokio
//! runtime, so callers never need to be inside one. Enqueueing never waits: a
//! full channel rejects the record.

use crate::batch::{self, SubmissionItem};
use crate::config::SubmitConfig;
use crate::counters::SubmitCounters;
use crate::error::{Result, SubmitError};
use parking_lot::{Condvar, Mutex};
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tracing::{debug, warn};
use url::Url;

/// Records accepted by the channel versus records the worker has counted.
#[derive(Debug, Default)]
struct Progress {
    state: Mutex<ProgressState>,
    settled: Condvar,
}

#[derive(Debug, Default)]
struct ProgressState {
    queued: u64,
    settled: u64,
    closed: bool,
}

impl Progress {
    fn settle(&self, count: u64) {
        let mut state = self.state.lock();
        state.settled += count;
        self.settled.notify_all();
    }

    fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.settled.notify_all();
    }
}

/// Marks progress closed when the worker exits, panics included.
struct CloseOnExit(Arc<Progress>);

impl Drop for CloseOnExit {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Handle to a running dispatcher.
pub(crate) struct Dispatcher {
    sender: Option<Sender<SubmissionItem>>,
    progress: Arc<Progress>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Start a dispatcher posting to `url`.
    pub(crate) fn start(url: Url, config: &SubmitConfig, counters: Arc<SubmitCounters>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SubmitError::configuration(format!("Failed to create HTTP client: {e}")))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SubmitError::configuration(format!("Failed to create runtime: {e}")))?;

        let (sender, receiver) = mpsc::channel(config.max_queue_depth);
        let progress = Arc::new(Progress::default());
        let worker = Worker {
            client,
            url,
            counters,
            progress: Arc::clone(&progress),
            max_batch_size: config.max_batch_size,
            runtime,
        };
        let worker = std::thread::Builder::new()
            .name("usage-logger-dispatch".to_string())
            .spawn(move || worker.run(receiver))
            .map_err(|e| SubmitError::configuration(format!("Failed to start dispatcher: {e}")))?;

        debug!(queue_depth = config.max_queue_depth, "Dispatcher started");
        Ok(Self {
            sender: Some(sender),
            progress,
            worker: Some(worker),
        })
    }

    /// Queue an item without waiting.
    ///
    /// Returns [`SubmitError::QueueFull`] when the worker is behind by
    /// `max_queue_depth` records; the item is dropped.
    pub(crate) fn enqueue(&self, item: SubmissionItem) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(SubmitError::Closed)?;
        let mut state = self.progress.state.lock();
        match sender.try_send(item) {
            Ok(()) => {
                state.queued += 1;
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(SubmitError::QueueFull),
            Err(TrySendError::Closed(_)) => Err(SubmitError::Closed),
        }
    }

    /// Block until everything queued so far has been dispatched and counted.
    ///
    /// Parks the calling thread only, so it is safe to call from code running
    /// on a tokio runtime.
    pub(crate) fn flush(&self) -> Result<()> {
        let mut state = self.progress.state.lock();
        let target = state.queued;
        while state.settled < target {
            if state.closed {
                return Err(SubmitError::Closed);
            }
            self.progress.settled.wait(&mut state);
        }
        Ok(())
    }

    /// Close the queue and wait for the worker to drain it.
    pub(crate) fn shutdown(&mut self) {
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Dispatcher thread panicked");
            }
            debug!("Dispatcher stopped");
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Worker {
    client: reqwest::Client,
    url: Url,
    counters: Arc<SubmitCounters>,
    progress: Arc<Progress>,
    max_batch_size: usize,
    runtime: Runtime,
}

impl Worker {
    fn run(self, mut receiver: Receiver<SubmissionItem>) {
        let _closed = CloseOnExit(Arc::clone(&self.progress));
        self.runtime.block_on(async {
            while let Some(first) = receiver.recv().await {
                let mut batch = vec![first];
                while batch.len() < self.max_batch_size {
                    match receiver.try_recv() {
                        Ok(item) => batch.push(item),
                        Err(_) => break,
                    }
                }
                self.dispatch(&batch).await;
                self.progress.settle(batch.len() as u64);
            }
        });
    }

    async fn dispatch(&self, batch: &[SubmissionItem]) {
        let size = batch.len() as u64;
        match self.post(batch).await {
            Ok(()) => {
                debug!(url = %self.url, batch_size = size, "Batch delivered");
                self.counters.record_successes(size);
            }
            Err(e) => {
                warn!(url = %self.url, batch_size = size, error = %e, "Batch submission failed");
                self.counters.record_failures(size);
            }
        }
    }

    async fn post(&self, batch: &[SubmissionItem]) -> Result<()> {
        let (body, compressed) = batch::encode(batch)?;
        let mut request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, batch::CONTENT_TYPE)
            .body(body);
        if compressed {
            request = request.header(CONTENT_ENCODING, batch::CONTENT_ENCODING);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            status => Err(SubmitError::Status {
                status: status.as_u16(),
            }),
        }
    }
}
