//! Sync run statistics
//!
//! Accumulator owned exclusively by one sync run. Created at run start,
//! mutated throughout, logged at run end, then discarded.

use serde::{Deserialize, Serialize};

/// Outcome counters for a single synchronization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    /// Records seen, including skipped and failed ones.
    pub total: u64,
    pub created: u64,
    pub updated: u64,
    pub unchanged: u64,
    pub errors: u64,
    /// Human-readable detail for each recorded error, in occurrence order.
    pub error_details: Vec<String>,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one error with its detail string.
    pub fn record_error(&mut self, detail: impl Into<String>) {
        self.errors += 1;
        self.error_details.push(detail.into());
    }

    /// True when the run completed without any recorded error.
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}
