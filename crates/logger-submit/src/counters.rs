//! Submission outcome counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Success and failure counts for one submitter.
///
/// Both values only ever grow. Every submitted record is counted exactly once.
#[derive(Debug, Default)]
pub struct SubmitCounters {
    successes: AtomicU64,
    failures: AtomicU64,
}

impl SubmitCounters {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `n` delivered records.
    pub fn record_successes(&self, n: u64) {
        self.successes.fetch_add(n, Ordering::AcqRel);
    }

    /// Count `n` lost records.
    pub fn record_failures(&self, n: u64) {
        self.failures.fetch_add(n, Ordering::AcqRel);
    }

    /// Delivered records so far.
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Acquire)
    }

    /// Lost records so far.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Acquire)
    }
}
