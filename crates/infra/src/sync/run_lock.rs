//! Single-flight guard for sync runs
//!
//! Each orchestrator owns one `RunLock`. A trigger that arrives while a run
//! is already in flight gets `None` and skips instead of queueing; the guard
//! releases the lock on drop, so early returns and panics cannot leave the
//! lock stuck.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-process mutual exclusion for one sync job.
#[derive(Debug, Default)]
pub struct RunLock {
    in_flight: Arc<AtomicBool>,
}

impl RunLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim the lock. Returns `None` when a run is already active.
    pub fn try_acquire(&self) -> Option<RunLockGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunLockGuard {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_locked(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Held for the duration of a run; releases the lock on drop.
#[derive(Debug)]
pub struct RunLockGuard {
    in_flight: Arc<AtomicBool>,
}

impl Drop for RunLockGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
