//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Phone normalization
pub const DEFAULT_COUNTRY_CALLING_CODE: &str = "57";

// Document identification
pub const DEFAULT_DOCUMENT_TYPE: &str = "CC";
pub const BILLING_DOCUMENT_META_KEY: &str = "_billing_document";

// Pagination defaults
pub const DEFAULT_ORDERS_PER_PAGE: u32 = 100;
pub const DEFAULT_CONTACTS_PAGE_SIZE: u32 = 100;

// Retry defaults
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_INITIAL_DELAY_MS: u64 = 1000;

// Chatwoot push
pub const DEFAULT_PUSH_CONCURRENCY: usize = 10;

// Reporting
pub const MAX_LOGGED_ERROR_DETAILS: usize = 5;
