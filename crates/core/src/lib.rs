//! # Storelink Core
//!
//! Port/adapter interfaces for the sync engine - no infrastructure code.
//!
//! This crate contains:
//! - Port traits over the contact store and sync settings
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//!
//! ## Architecture Principles
//! - Only depends on `storelink-domain`
//! - Infrastructure implements these traits in `storelink-infra`

pub mod contacts;
pub mod sync;

// Re-export specific items to avoid ambiguity
pub use contacts::ports::ContactStore;
pub use sync::ports::SyncSettings;
