//! Where submitted records go.

use parking_lot::Mutex;
use std::sync::Arc;
use url::Url;

/// In-memory list of submitted messages.
///
/// Clones share the same storage, so a caller can keep one handle and give
/// another to a logger.
#[derive(Debug, Clone, Default)]
pub struct MessageQueue {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MessageQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&self, message: impl Into<String>) {
        self.messages.lock().push(message.into());
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Whether the queue holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Message at `index`.
    pub fn get(&self, index: usize) -> Option<String> {
        self.messages.lock().get(index).cloned()
    }

    /// Copy of every message in submission order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Remove every message.
    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

/// Destination of a submitter.
#[derive(Debug, Clone)]
pub enum Destination {
    /// Append messages to an in-memory queue.
    Queue(MessageQueue),
    /// POST batches to a collector.
    Url(Url),
}

impl Destination {
    /// The collector URL, if any.
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Url(url) => Some(url),
            Self::Queue(_) => None,
        }
    }

    /// The in-memory queue, if any.
    pub fn queue(&self) -> Option<&MessageQueue> {
        match self {
            Self::Queue(queue) => Some(queue),
            Self::Url(_) => None,
        }
    }
}
