//! Usage accounting.
//!
//! One process-wide counter of successful transformations, shared by handle
//! so tests can inject a fresh one per case. The orchestrator is the sole
//! writer; everything else reads. Demo runs count the same as live runs so
//! quota accounting stays consistent across mode switches.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct UsageCounter {
    transforms: AtomicU64,
}

impl UsageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful pipeline run; returns the new total.
    pub fn record_success(&self) -> u64 {
        self.transforms.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn total(&self) -> u64 {
        self.transforms.load(Ordering::Relaxed)
    }
}
