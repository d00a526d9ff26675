//! Port interfaces for the contact store

use async_trait::async_trait;
use storelink_domain::{Contact, ContactDraft, ContactPage, Result};

/// Trait over the document store that owns contact entities.
///
/// The store enforces uniqueness on email and on document type + number
/// (sparse), and manages soft-delete state and audit timestamps itself; the
/// sync engine only submits drafts and never writes those fields. A create
/// that races another writer on the same email fails with
/// `StorelinkError::Conflict`.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Find a contact by exact email match. Email is unique, so at most one
    /// result exists.
    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>>;

    /// Create a new contact from a draft.
    async fn create(&self, draft: &ContactDraft) -> Result<Contact>;

    /// Update an existing contact. Returns `None` when the id is unknown.
    async fn update(&self, id: &str, draft: &ContactDraft) -> Result<Option<Contact>>;

    /// Fetch one page of non-deleted contacts. Pages are 1-based.
    async fn find_page(&self, page: u32, limit: u32) -> Result<ContactPage>;
}
