//! # Storelink Domain
//!
//! Business domain types and models for Storelink.
//!
//! This crate contains:
//! - Domain data types (Contact, RemoteOrder, SyncStats, etc.)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Pure mapping and normalization utilities
//!
//! ## Architecture
//! - No dependencies on other Storelink crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod mapping;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export mapping utilities
pub use mapping::{has_contact_changed, map_order_to_contact};
pub use utils::phone::normalize_phone;
