//! Chatwoot contact push orchestrator
//!
//! Pushes local contacts out to Chatwoot page by page. Unlike the customer
//! pull, pushes within a page run with bounded concurrency: the remote CRM
//! is the resource being protected, and there is no local uniqueness race
//! to serialize against. Completion order across contacts is therefore not
//! guaranteed; the report counters are order-independent.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use storelink_core::{ContactStore, SyncSettings};
use storelink_domain::constants::{DEFAULT_CONTACTS_PAGE_SIZE, MAX_LOGGED_ERROR_DETAILS};
use storelink_domain::{ChatwootConfig, Contact, SyncStats};

use crate::sync::{RetryPolicy, RunLock, SyncError};

use super::client::{ChatwootClient, ChatwootClientConfig};

/// How a push resolved on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Created,
    Updated,
}

/// Outbound contact seam, so the push loop can be tested without HTTP.
#[async_trait]
pub trait ContactPusher: Send + Sync {
    /// Upsert one contact on the remote CRM.
    async fn push_contact(&self, contact: &Contact) -> Result<PushOutcome, SyncError>;
}

#[async_trait]
impl ContactPusher for ChatwootClient {
    async fn push_contact(&self, contact: &Contact) -> Result<PushOutcome, SyncError> {
        match self.search_contact(&contact.email).await? {
            Some(existing) => {
                self.update_contact(existing.id, contact).await?;
                Ok(PushOutcome::Updated)
            }
            None => {
                self.create_contact(contact).await?;
                Ok(PushOutcome::Created)
            }
        }
    }
}

/// Contact push orchestrator for one Chatwoot account.
pub struct ContactPush {
    store: Arc<dyn ContactStore>,
    pusher: Option<Arc<dyn ContactPusher>>,
    settings: ChatwootConfig,
    retry: RetryPolicy,
    run_lock: RunLock,
}

impl ContactPush {
    /// Create an orchestrator over an explicit pusher.
    pub fn new(
        store: Arc<dyn ContactStore>,
        pusher: Arc<dyn ContactPusher>,
        settings: ChatwootConfig,
    ) -> Self {
        Self {
            store,
            pusher: Some(pusher),
            settings,
            retry: RetryPolicy::default(),
            run_lock: RunLock::new(),
        }
    }

    /// Build from integration settings. An unconfigured integration yields
    /// an orchestrator whose runs are no-ops.
    pub fn from_settings(
        store: Arc<dyn ContactStore>,
        settings: ChatwootConfig,
    ) -> Result<Self, SyncError> {
        if !settings.is_configured() {
            return Ok(Self {
                store,
                pusher: None,
                settings,
                retry: RetryPolicy::default(),
                run_lock: RunLock::new(),
            });
        }

        let client = Arc::new(ChatwootClient::new(ChatwootClientConfig::from_settings(
            &settings,
        ))?);
        Ok(Self::new(store, client, settings))
    }

    /// Override the retry policy (tuning and tests).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Cron/manual trigger wrapper around [`Self::push_all`].
    #[instrument(skip(self))]
    pub async fn execute_push(&self) -> Option<SyncStats> {
        let Some(_guard) = self.run_lock.try_acquire() else {
            info!("Contact push already running, trigger skipped");
            return None;
        };

        let settings: &dyn SyncSettings = &self.settings;
        if !settings.is_enabled() {
            debug!("Contact push disabled, trigger skipped");
            return None;
        }
        if !settings.is_configured() {
            debug!("Chatwoot not configured, trigger skipped");
            return None;
        }

        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, "Starting contact push run");

        let stats = self.push_all().await;

        info!(
            run_id = %run_id,
            total = stats.total,
            created = stats.created,
            updated = stats.updated,
            errors = stats.errors,
            "Contact push run finished"
        );
        for detail in stats.error_details.iter().take(MAX_LOGGED_ERROR_DETAILS) {
            warn!(run_id = %run_id, "Push error: {detail}");
        }
        let remaining = stats.error_details.len().saturating_sub(MAX_LOGGED_ERROR_DETAILS);
        if remaining > 0 {
            warn!(run_id = %run_id, remaining, "Further push errors omitted from log");
        }

        Some(stats)
    }

    /// Push every non-deleted local contact to the remote CRM.
    ///
    /// Pages are fetched sequentially; within a page up to
    /// `push_concurrency` pushes are in flight at once. Per-contact errors
    /// are recorded and the batch continues.
    pub async fn push_all(&self) -> SyncStats {
        let mut stats = SyncStats::new();

        let Some(pusher) = &self.pusher else {
            debug!("Chatwoot not configured, nothing to push");
            return stats;
        };

        let limit = DEFAULT_CONTACTS_PAGE_SIZE;
        let mut page = 1u32;

        loop {
            let contact_page = match self.store.find_page(page, limit).await {
                Ok(contact_page) => contact_page,
                Err(err) => {
                    error!(page, error = %err, "Contact page fetch failed, ending run early");
                    stats.record_error(format!("Fatal: contact page {page} fetch failed: {err}"));
                    break;
                }
            };
            if contact_page.data.is_empty() {
                break;
            }
            let total = contact_page.total;

            let results: Vec<(String, Result<PushOutcome, SyncError>)> =
                stream::iter(contact_page.data.into_iter().map(|contact| {
                    let pusher = Arc::clone(pusher);
                    let retry = self.retry.clone();
                    async move {
                        let contact_ref = &contact;
                        let pusher_ref = &pusher;
                        let outcome = retry
                            .execute(move || {
                                let pusher = Arc::clone(pusher_ref);
                                async move { pusher.push_contact(contact_ref).await }
                            })
                            .await;
                        (contact.email.clone(), outcome)
                    }
                }))
                .buffer_unordered(self.settings.push_concurrency.max(1))
                .collect()
                .await;

            for (email, outcome) in results {
                stats.total += 1;
                match outcome {
                    Ok(PushOutcome::Created) => stats.created += 1,
                    Ok(PushOutcome::Updated) => stats.updated += 1,
                    Err(err) => stats.record_error(format!("Contact {email}: push failed: {err}")),
                }
            }

            if u64::from(page) * u64::from(limit) >= total {
                break;
            }
            page += 1;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::time::Duration;
    use storelink_domain::{ContactDraft, ContactPage, Result as StoreResult, StorelinkError};

    fn settings(concurrency: usize) -> ChatwootConfig {
        ChatwootConfig {
            base_url: "https://chatwoot.example.com".to_string(),
            api_token: "token".to_string(),
            account_id: 1,
            enabled: true,
            cron_schedule: "0 30 * * * *".to_string(),
            push_concurrency: concurrency,
        }
    }

    fn contact(n: usize) -> Contact {
        Contact {
            id: format!("c-{n}"),
            document_type: None,
            document_number: None,
            first_name: Some("Test".to_string()),
            last_name: None,
            email: format!("c{n}@example.com"),
            phone: None,
            address: None,
            address_extra: None,
            city_code: None,
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Store serving a fixed contact list in pages.
    struct PagedStore {
        contacts: Vec<Contact>,
        page_size: u32,
    }

    #[async_trait]
    impl ContactStore for PagedStore {
        async fn find_by_email(&self, _email: &str) -> StoreResult<Option<Contact>> {
            Ok(None)
        }

        async fn create(&self, _draft: &ContactDraft) -> StoreResult<Contact> {
            Err(StorelinkError::Internal("not used".to_string()))
        }

        async fn update(&self, _id: &str, _draft: &ContactDraft) -> StoreResult<Option<Contact>> {
            Ok(None)
        }

        async fn find_page(&self, page: u32, _limit: u32) -> StoreResult<ContactPage> {
            let start = ((page - 1) * self.page_size) as usize;
            let end = (start + self.page_size as usize).min(self.contacts.len());
            let data = if start < self.contacts.len() {
                self.contacts[start..end].to_vec()
            } else {
                Vec::new()
            };
            Ok(ContactPage {
                data,
                total: self.contacts.len() as u64,
            })
        }
    }

    /// Pusher tracking the number of simultaneously in-flight pushes.
    struct GaugedPusher {
        in_flight: AtomicUsize,
        high_water: AtomicUsize,
        fail_emails: Vec<String>,
        rate_limit_first: AtomicU32,
    }

    impl GaugedPusher {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                high_water: AtomicUsize::new(0),
                fail_emails: Vec::new(),
                rate_limit_first: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ContactPusher for GaugedPusher {
        async fn push_contact(&self, contact: &Contact) -> Result<PushOutcome, SyncError> {
            if self.rate_limit_first.load(Ordering::SeqCst) > 0 {
                self.rate_limit_first.fetch_sub(1, Ordering::SeqCst);
                return Err(SyncError::RateLimited("throttled".to_string()));
            }

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.high_water.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_emails.contains(&contact.email) {
                return Err(SyncError::Unknown("remote rejected".to_string()));
            }
            Ok(PushOutcome::Created)
        }
    }

    fn push_with(store: PagedStore, pusher: Arc<GaugedPusher>, concurrency: usize) -> ContactPush {
        ContactPush::new(Arc::new(store), pusher, settings(concurrency))
            .with_retry_policy(RetryPolicy::new(0, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_pushes_all_pages() {
        let store = PagedStore {
            contacts: (0..25).map(contact).collect(),
            page_size: 100,
        };
        let pusher = Arc::new(GaugedPusher::new());
        let push = push_with(store, pusher.clone(), 10);

        let stats = push.push_all().await;

        assert_eq!(stats.total, 25);
        assert_eq!(stats.created, 25);
        assert!(stats.is_clean());
    }

    #[tokio::test]
    async fn test_concurrency_stays_bounded() {
        let store = PagedStore {
            contacts: (0..30).map(contact).collect(),
            page_size: 100,
        };
        let pusher = Arc::new(GaugedPusher::new());
        let push = push_with(store, pusher.clone(), 5);

        let stats = push.push_all().await;

        assert_eq!(stats.total, 30);
        let high_water = pusher.high_water.load(Ordering::SeqCst);
        assert!(high_water <= 5, "high water was {high_water}");
        assert!(high_water > 1, "pushes never overlapped");
    }

    #[tokio::test]
    async fn test_per_contact_errors_do_not_abort_batch() {
        let mut pusher = GaugedPusher::new();
        pusher.fail_emails = vec!["c3@example.com".to_string(), "c7@example.com".to_string()];

        let store = PagedStore {
            contacts: (0..10).map(contact).collect(),
            page_size: 100,
        };
        let push = push_with(store, Arc::new(pusher), 4);

        let stats = push.push_all().await;

        assert_eq!(stats.total, 10);
        assert_eq!(stats.created, 8);
        assert_eq!(stats.errors, 2);
        assert!(stats
            .error_details
            .iter()
            .all(|detail| detail.contains("push failed")));
    }

    #[tokio::test]
    async fn test_rate_limited_push_is_retried() {
        let pusher = Arc::new(GaugedPusher::new());
        pusher.rate_limit_first.store(2, Ordering::SeqCst);

        let store = PagedStore {
            contacts: vec![contact(0)],
            page_size: 100,
        };
        let push = ContactPush::new(Arc::new(store), pusher, settings(2))
            .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(1)));

        let stats = push.push_all().await;

        assert_eq!(stats.created, 1);
        assert!(stats.is_clean());
    }

    #[tokio::test]
    async fn test_execute_push_keeps_details_beyond_log_cap() {
        let mut pusher = GaugedPusher::new();
        pusher.fail_emails = (0..8).map(|n| format!("c{n}@example.com")).collect();

        let store = PagedStore {
            contacts: (0..8).map(contact).collect(),
            page_size: 100,
        };
        let push = push_with(store, Arc::new(pusher), 4);

        let stats = push.execute_push().await.expect("run executes");

        // The log caps at MAX_LOGGED_ERROR_DETAILS; the report never does.
        assert!(stats.error_details.len() > MAX_LOGGED_ERROR_DETAILS);
        assert_eq!(stats.errors, 8);
        assert_eq!(stats.error_details.len(), 8);
    }

    #[tokio::test]
    async fn test_disabled_integration_skips_execute_push() {
        let mut disabled = settings(10);
        disabled.enabled = false;

        let store = PagedStore {
            contacts: vec![contact(0)],
            page_size: 100,
        };
        let push = ContactPush::new(Arc::new(store), Arc::new(GaugedPusher::new()), disabled);

        assert!(push.execute_push().await.is_none());
    }
}
