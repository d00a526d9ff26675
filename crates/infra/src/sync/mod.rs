//! Sync infrastructure for Storelink
//!
//! This module provides the building blocks shared by both sync flavors:
//! - SyncError: typed remote-failure taxonomy produced by the client adapters
//! - RetryPolicy: bounded exponential backoff for rate-limited calls
//! - RunLock: single-flight guard preventing overlapping sync runs

pub mod errors;
pub mod retry;
pub mod run_lock;

pub use errors::{SyncError, SyncErrorCategory};
pub use retry::RetryPolicy;
pub use run_lock::{RunLock, RunLockGuard};
