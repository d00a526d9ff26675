//! Cron-based schedulers for the sync jobs

pub mod contact_push_scheduler;
pub mod customer_sync_scheduler;
pub mod error;

pub use contact_push_scheduler::{ContactPushScheduler, ContactPushSchedulerConfig};
pub use customer_sync_scheduler::{CustomerSyncScheduler, CustomerSyncSchedulerConfig};
pub use error::{SchedulerError, SchedulerResult};
