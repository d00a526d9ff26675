//! # Storelink Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP clients for the commerce platforms (WooCommerce, Chatwoot)
//! - The synchronization engine (retry policy, pagination, orchestrators)
//! - Cron-based schedulers with explicit lifecycle management
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `storelink-core`
//! - Contains all "impure" code (network I/O, clocks, schedulers)

pub mod config;
pub mod integrations;
pub mod scheduling;
pub mod sync;

// Re-export commonly used items
pub use integrations::chatwoot::{ChatwootClient, ChatwootClientConfig, ContactPush};
pub use integrations::woocommerce::{
    RemoteOrderSource, WooClient, WooClientConfig, WooCustomerSync,
};
pub use sync::{RetryPolicy, RunLock, SyncError};
