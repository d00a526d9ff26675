//! Contact types
//!
//! `Contact` mirrors the entity owned by the contact store; the sync engine
//! reads it but never writes soft-delete or audit fields directly.
//! `ContactDraft` is the transient shape produced by order mapping, with no
//! identity until the store persists it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted contact entity, keyed by an opaque store-assigned id.
///
/// Unique on email; unique on document (type + number) when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub address_extra: Option<String>,
    pub city_code: Option<String>,
    /// Soft-delete state, managed by the store.
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Audit timestamps, managed by the store.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transient contact representation derived from a remote order.
///
/// Carries only the fields the sync engine is allowed to submit; the store
/// owns ids, soft-delete state and audit timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub document_type: Option<String>,
    pub document_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Always lower-cased.
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub address_extra: Option<String>,
    pub city_code: Option<String>,
}

/// One page of contacts from a paginated store query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPage {
    pub data: Vec<Contact>,
    /// Total matching contacts across all pages.
    pub total: u64,
}
