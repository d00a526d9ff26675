//! WooCommerce customer synchronization orchestrator
//!
//! Streams order pages from the remote store, maps each billing record to a
//! contact draft, and upserts it into the local contact store. Records are
//! processed strictly sequentially; the per-run seen-email set and the
//! duplicate-key race handling both depend on that ordering.
//!
//! The public entry points never fail: a run always completes with a
//! [`SyncStats`] report, with every per-record failure folded into it.

use std::collections::HashSet;
use std::sync::Arc;

use futures::TryStreamExt;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use storelink_core::{ContactStore, SyncSettings};
use storelink_domain::constants::MAX_LOGGED_ERROR_DETAILS;
use storelink_domain::{
    has_contact_changed, map_order_to_contact, Contact, ContactDraft, RemoteOrder, SyncStats,
    WooCommerceConfig,
};

use crate::sync::{RetryPolicy, RunLock, SyncError};

use super::client::{WooClient, WooClientConfig};
use super::source::{OrderPageFetcher, RemoteOrderSource};

/// Customer sync orchestrator for one WooCommerce store.
pub struct WooCustomerSync {
    store: Arc<dyn ContactStore>,
    fetcher: Option<Arc<dyn OrderPageFetcher>>,
    source: RemoteOrderSource,
    settings: WooCommerceConfig,
    retry: RetryPolicy,
    run_lock: RunLock,
}

impl WooCustomerSync {
    /// Create an orchestrator over an explicit fetcher.
    pub fn new(
        store: Arc<dyn ContactStore>,
        fetcher: Arc<dyn OrderPageFetcher>,
        settings: WooCommerceConfig,
    ) -> Self {
        Self {
            store,
            source: RemoteOrderSource::new(Arc::clone(&fetcher)),
            fetcher: Some(fetcher),
            settings,
            retry: RetryPolicy::default(),
            run_lock: RunLock::new(),
        }
    }

    /// Build from integration settings. An unconfigured integration yields
    /// an orchestrator whose runs are no-ops.
    pub fn from_settings(
        store: Arc<dyn ContactStore>,
        settings: WooCommerceConfig,
    ) -> Result<Self, SyncError> {
        if !settings.is_configured() {
            return Ok(Self {
                store,
                fetcher: None,
                source: RemoteOrderSource::disabled(),
                settings,
                retry: RetryPolicy::default(),
                run_lock: RunLock::new(),
            });
        }

        let client = Arc::new(WooClient::new(WooClientConfig::from_settings(&settings))?);
        Ok(Self::new(store, client, settings))
    }

    /// Override the retry policy (tuning and tests).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Cron/manual trigger wrapper around [`Self::sync_customers`].
    ///
    /// Skips without error when a run is already in flight, when the
    /// integration is disabled or unconfigured, or when the connection
    /// check fails. Returns the run report otherwise.
    #[instrument(skip(self))]
    pub async fn execute_sync(&self) -> Option<SyncStats> {
        let Some(_guard) = self.run_lock.try_acquire() else {
            info!("Customer sync already running, trigger skipped");
            return None;
        };

        let settings: &dyn SyncSettings = &self.settings;
        if !settings.is_enabled() {
            debug!("Customer sync disabled, trigger skipped");
            return None;
        }
        if !settings.is_configured() {
            debug!("WooCommerce not configured, trigger skipped");
            return None;
        }

        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, "Starting customer sync run");

        if let Some(fetcher) = &self.fetcher {
            if let Err(err) = fetcher.test_connection().await {
                error!(run_id = %run_id, error = %err, "Connection check failed, aborting sync");
                return None;
            }
        }

        let stats = self.sync_customers().await;
        self.log_report(run_id, &stats);
        Some(stats)
    }

    /// Fire-and-forget trigger: schedules [`Self::execute_sync`] on the
    /// runtime and returns immediately.
    pub fn spawn_sync(self: &Arc<Self>) {
        let sync = Arc::clone(self);
        tokio::spawn(async move {
            sync.execute_sync().await;
        });
    }

    /// One full sync pass over the remote order stream.
    ///
    /// Always returns a report; a stream-level failure is folded in as one
    /// fatal error detail with the records processed so far intact.
    pub async fn sync_customers(&self) -> SyncStats {
        let mut stats = SyncStats::new();
        let mut seen_emails = HashSet::new();

        let mut pages = self.source.order_stream(self.settings.per_page);
        loop {
            match pages.try_next().await {
                Ok(Some(orders)) => {
                    for order in &orders {
                        self.handle_order(order, &mut stats, &mut seen_emails).await;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    error!(error = %err, "Order stream failed, ending run early");
                    stats.record_error(format!("Fatal: order stream failed: {err}"));
                    break;
                }
            }
        }

        stats
    }

    /// Targeted sync for an explicit email list (manual trigger).
    #[instrument(skip(self, emails), fields(count = emails.len()))]
    pub async fn sync_emails(&self, emails: &[String]) -> SyncStats {
        let mut stats = SyncStats::new();
        let mut seen_emails = HashSet::new();

        let Some(fetcher) = &self.fetcher else {
            debug!("WooCommerce not configured, nothing to sync");
            return stats;
        };

        for email in emails {
            match fetcher.fetch_by_email(email).await {
                Ok(orders) => {
                    for order in &orders {
                        self.handle_order(order, &mut stats, &mut seen_emails).await;
                    }
                }
                Err(err) => {
                    stats.record_error(format!("Email {email}: order fetch failed: {err}"));
                }
            }
        }

        stats
    }

    async fn handle_order(
        &self,
        order: &RemoteOrder,
        stats: &mut SyncStats,
        seen_emails: &mut HashSet<String>,
    ) {
        stats.total += 1;

        let email = order.billing.email.trim().to_lowercase();
        if email.is_empty() {
            stats.record_error(format!("Order {}: missing billing email", order.id));
            return;
        }
        // One upsert per customer per run, regardless of order count.
        if !seen_emails.insert(email) {
            return;
        }

        self.process_order(order, stats).await;
    }

    /// Per-record upsert: map, look up by email, then create or update.
    ///
    /// Every failure terminates in one stats entry; nothing escapes to the
    /// caller, so one bad record cannot take down its siblings.
    async fn process_order(&self, order: &RemoteOrder, stats: &mut SyncStats) {
        let Some(draft) = map_order_to_contact(order) else {
            stats.record_error(format!("Order {}: invalid or missing data", order.id));
            return;
        };

        // A failed lookup must not fall through to create, or a transient
        // store error would mint duplicates.
        let existing = match self.store.find_by_email(&draft.email).await {
            Ok(existing) => existing,
            Err(err) => {
                stats.record_error(format!("Order {}: lookup failed: {err}", order.id));
                return;
            }
        };

        match existing {
            Some(contact) => self.update_if_changed(&contact, &draft, order.id, stats).await,
            None => self.create_contact(&draft, order.id, stats).await,
        }
    }

    async fn update_if_changed(
        &self,
        existing: &Contact,
        draft: &ContactDraft,
        order_id: u64,
        stats: &mut SyncStats,
    ) {
        if !has_contact_changed(existing, draft) {
            stats.unchanged += 1;
            return;
        }

        let result = self
            .retry
            .execute(|| {
                let store = Arc::clone(&self.store);
                let id = existing.id.clone();
                async move { store.update(&id, draft).await.map_err(SyncError::from) }
            })
            .await;

        match result {
            Ok(Some(_)) => {
                debug!(contact_id = %existing.id, "Contact updated");
                stats.updated += 1;
            }
            Ok(None) => {
                stats.record_error(format!(
                    "Order {order_id}: update failed: contact {} no longer exists",
                    existing.id
                ));
            }
            Err(err) => {
                stats.record_error(format!("Order {order_id}: update failed: {err}"));
            }
        }
    }

    async fn create_contact(&self, draft: &ContactDraft, order_id: u64, stats: &mut SyncStats) {
        let result = self
            .retry
            .execute(|| {
                let store = Arc::clone(&self.store);
                async move { store.create(draft).await.map_err(SyncError::from) }
            })
            .await;

        match result {
            Ok(contact) => {
                debug!(contact_id = %contact.id, "Contact created");
                stats.created += 1;
            }
            Err(err) if err.is_conflict() => {
                // Another writer created this email between our lookup and
                // create; fall back to update-if-changed.
                warn!(email = %draft.email, "Duplicate key on create, re-resolving");
                self.recover_create_race(draft, order_id, stats).await;
            }
            Err(err) => {
                stats.record_error(format!("Order {order_id}: creation failed: {err}"));
            }
        }
    }

    async fn recover_create_race(
        &self,
        draft: &ContactDraft,
        order_id: u64,
        stats: &mut SyncStats,
    ) {
        match self.store.find_by_email(&draft.email).await {
            Ok(Some(existing)) => self.update_if_changed(&existing, draft, order_id, stats).await,
            Ok(None) => {
                stats.record_error(format!(
                    "Order {order_id}: contact not found after duplicate key error"
                ));
            }
            Err(err) => {
                stats.record_error(format!(
                    "Order {order_id}: lookup failed after duplicate key error: {err}"
                ));
            }
        }
    }

    fn log_report(&self, run_id: Uuid, stats: &SyncStats) {
        info!(
            run_id = %run_id,
            total = stats.total,
            created = stats.created,
            updated = stats.updated,
            unchanged = stats.unchanged,
            errors = stats.errors,
            "Customer sync run finished"
        );

        for detail in stats.error_details.iter().take(MAX_LOGGED_ERROR_DETAILS) {
            warn!(run_id = %run_id, "Sync error: {detail}");
        }
        let remaining = stats.error_details.len().saturating_sub(MAX_LOGGED_ERROR_DETAILS);
        if remaining > 0 {
            warn!(run_id = %run_id, remaining, "Further sync errors omitted from log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use storelink_domain::types::{BillingAddress, OrderMeta};
    use storelink_domain::{Result as StoreResult, StorelinkError};
    use tokio::sync::Notify;

    use crate::integrations::woocommerce::client::OrderPage;

    fn settings() -> WooCommerceConfig {
        WooCommerceConfig {
            base_url: "https://shop.example.com".to_string(),
            consumer_key: "ck".to_string(),
            consumer_secret: "cs".to_string(),
            enabled: true,
            cron_schedule: "0 0 * * * *".to_string(),
            per_page: 100,
        }
    }

    fn order(id: u64, email: &str) -> RemoteOrder {
        RemoteOrder {
            id,
            billing: BillingAddress {
                first_name: "Ana".to_string(),
                last_name: "Gomez".to_string(),
                email: email.to_string(),
                phone: "300 123 4567".to_string(),
                address_1: "Calle 1".to_string(),
                address_2: String::new(),
                city: "11001".to_string(),
            },
            meta_data: vec![OrderMeta {
                key: "_billing_document".to_string(),
                value: "123456".to_string(),
            }],
        }
    }

    fn contact_from(draft: &ContactDraft, id: &str) -> Contact {
        Contact {
            id: id.to_string(),
            document_type: draft.document_type.clone(),
            document_number: draft.document_number.clone(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            address: draft.address.clone(),
            address_extra: draft.address_extra.clone(),
            city_code: draft.city_code.clone(),
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// In-memory contact store with scriptable failures.
    #[derive(Default)]
    struct MockStore {
        contacts: Mutex<HashMap<String, Contact>>,
        fail_lookups: AtomicBool,
        conflict_on_create: AtomicBool,
        create_calls: AtomicU32,
        update_calls: AtomicU32,
    }

    impl MockStore {
        fn with_contact(self, contact: Contact) -> Self {
            if let Ok(mut contacts) = self.contacts.lock() {
                contacts.insert(contact.email.clone(), contact);
            }
            self
        }
    }

    #[async_trait]
    impl ContactStore for MockStore {
        async fn find_by_email(&self, email: &str) -> StoreResult<Option<Contact>> {
            if self.fail_lookups.load(Ordering::SeqCst) {
                return Err(StorelinkError::Store("lookup unavailable".to_string()));
            }
            let contacts = self
                .contacts
                .lock()
                .map_err(|_| StorelinkError::Internal("poisoned".to_string()))?;
            Ok(contacts.get(email).cloned())
        }

        async fn create(&self, draft: &ContactDraft) -> StoreResult<Contact> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            let mut contacts = self
                .contacts
                .lock()
                .map_err(|_| StorelinkError::Internal("poisoned".to_string()))?;

            if self.conflict_on_create.swap(false, Ordering::SeqCst) {
                // Simulate a concurrent writer landing first.
                let racer = contact_from(draft, "racer-1");
                contacts.insert(draft.email.clone(), racer);
                return Err(StorelinkError::Conflict("Duplicate key".to_string()));
            }
            if contacts.contains_key(&draft.email) {
                return Err(StorelinkError::Conflict("Duplicate key".to_string()));
            }

            let contact = contact_from(draft, &format!("c-{}", contacts.len() + 1));
            contacts.insert(draft.email.clone(), contact.clone());
            Ok(contact)
        }

        async fn update(&self, id: &str, draft: &ContactDraft) -> StoreResult<Option<Contact>> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            let mut contacts = self
                .contacts
                .lock()
                .map_err(|_| StorelinkError::Internal("poisoned".to_string()))?;

            let Some(existing) = contacts.values().find(|c| c.id == id).cloned() else {
                return Ok(None);
            };
            let updated = contact_from(draft, &existing.id);
            contacts.insert(updated.email.clone(), updated.clone());
            Ok(Some(updated))
        }

        async fn find_page(&self, _page: u32, _limit: u32) -> StoreResult<storelink_domain::ContactPage> {
            Ok(storelink_domain::ContactPage {
                data: Vec::new(),
                total: 0,
            })
        }
    }

    /// Fetcher serving a fixed set of pages.
    struct FixedFetcher {
        pages: Vec<Vec<RemoteOrder>>,
        fail_after_first: bool,
        by_email: HashMap<String, Vec<RemoteOrder>>,
    }

    impl FixedFetcher {
        fn one_page(orders: Vec<RemoteOrder>) -> Arc<Self> {
            Arc::new(Self {
                pages: vec![orders],
                fail_after_first: false,
                by_email: HashMap::new(),
            })
        }
    }

    #[async_trait]
    impl OrderPageFetcher for FixedFetcher {
        async fn fetch_page(&self, page: u32, _per_page: u32) -> Result<OrderPage, SyncError> {
            if self.fail_after_first && page > 1 {
                return Err(SyncError::Network("connection reset".to_string()));
            }
            let total_pages = if self.fail_after_first {
                2
            } else {
                self.pages.len().max(1) as u32
            };
            Ok(OrderPage {
                orders: self
                    .pages
                    .get((page - 1) as usize)
                    .cloned()
                    .unwrap_or_default(),
                total_pages,
            })
        }

        async fn fetch_by_email(&self, email: &str) -> Result<Vec<RemoteOrder>, SyncError> {
            Ok(self.by_email.get(email).cloned().unwrap_or_default())
        }
    }

    fn sync_with(store: Arc<MockStore>, fetcher: Arc<dyn OrderPageFetcher>) -> WooCustomerSync {
        WooCustomerSync::new(store, fetcher, settings())
            .with_retry_policy(RetryPolicy::new(0, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_creates_new_contact() {
        let store = Arc::new(MockStore::default());
        let sync = sync_with(
            store.clone(),
            FixedFetcher::one_page(vec![order(1, "ana@example.com")]),
        );

        let stats = sync.sync_customers().await;

        assert_eq!(stats.total, 1);
        assert_eq!(stats.created, 1);
        assert!(stats.is_clean());
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_email_records_error_without_store_calls() {
        let store = Arc::new(MockStore::default());
        let sync = sync_with(store.clone(), FixedFetcher::one_page(vec![order(1, "  ")]));

        let stats = sync.sync_customers().await;

        assert_eq!(stats.errors, 1);
        assert!(stats.error_details[0].contains("missing billing email"));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_within_run_is_skipped_silently() {
        let store = Arc::new(MockStore::default());
        let sync = sync_with(
            store.clone(),
            FixedFetcher::one_page(vec![
                order(1, "ana@example.com"),
                order(2, "ANA@example.com"),
            ]),
        );

        let stats = sync.sync_customers().await;

        assert_eq!(stats.total, 2);
        assert_eq!(stats.created, 1);
        assert!(stats.is_clean());
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let store = Arc::new(MockStore::default());
        let fetcher = FixedFetcher::one_page(vec![order(1, "ana@example.com")]);
        let sync = sync_with(store.clone(), fetcher);

        let first = sync.sync_customers().await;
        let second = sync.sync_customers().await;

        assert_eq!(first.created, 1);
        assert_eq!(second.created, 0);
        assert_eq!(second.unchanged, 1);
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_changed_contact_is_updated() {
        let mut existing_order = order(1, "ana@example.com");
        existing_order.billing.phone = "301 000 0000".to_string();
        let existing = contact_from(
            &map_order_to_contact(&existing_order).expect("mappable"),
            "c-1",
        );

        let store = Arc::new(MockStore::default().with_contact(existing));
        let sync = sync_with(
            store.clone(),
            FixedFetcher::one_page(vec![order(1, "ana@example.com")]),
        );

        let stats = sync.sync_customers().await;

        assert_eq!(stats.updated, 1);
        assert_eq!(stats.created, 0);
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_race_recovers_via_relookup() {
        let store = Arc::new(MockStore::default());
        store.conflict_on_create.store(true, Ordering::SeqCst);

        let sync = sync_with(
            store.clone(),
            FixedFetcher::one_page(vec![order(1, "ana@example.com")]),
        );

        let stats = sync.sync_customers().await;

        // The racing writer inserted identical data, so the recovery path
        // resolves to unchanged.
        assert!(stats.is_clean());
        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.created, 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_does_not_fall_through_to_create() {
        let store = Arc::new(MockStore::default());
        store.fail_lookups.store(true, Ordering::SeqCst);

        let sync = sync_with(
            store.clone(),
            FixedFetcher::one_page(vec![order(1, "ana@example.com")]),
        );

        let stats = sync.sync_customers().await;

        assert_eq!(stats.errors, 1);
        assert!(stats.error_details[0].contains("lookup failed"));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stream_failure_returns_degraded_report() {
        let store = Arc::new(MockStore::default());
        let fetcher = Arc::new(FixedFetcher {
            pages: vec![vec![order(1, "ana@example.com")]],
            fail_after_first: true,
            by_email: HashMap::new(),
        });

        let sync = sync_with(store.clone(), fetcher);
        let stats = sync.sync_customers().await;

        // Page one processed, then one fatal detail for the dead stream.
        assert_eq!(stats.created, 1);
        assert_eq!(stats.errors, 1);
        assert!(stats.error_details[0].starts_with("Fatal:"));
    }

    #[tokio::test]
    async fn test_sync_emails_targets_given_addresses() {
        let store = Arc::new(MockStore::default());
        let mut by_email = HashMap::new();
        by_email.insert(
            "ana@example.com".to_string(),
            vec![order(1, "ana@example.com")],
        );
        let fetcher = Arc::new(FixedFetcher {
            pages: Vec::new(),
            fail_after_first: false,
            by_email,
        });

        let sync = sync_with(store.clone(), fetcher);
        let stats = sync
            .sync_emails(&["ana@example.com".to_string(), "none@example.com".to_string()])
            .await;

        assert_eq!(stats.created, 1);
        assert!(stats.is_clean());
    }

    #[tokio::test]
    async fn test_disabled_integration_skips_execute_sync() {
        let store = Arc::new(MockStore::default());
        let mut disabled = settings();
        disabled.enabled = false;

        let sync = WooCustomerSync::new(
            store.clone(),
            FixedFetcher::one_page(vec![order(1, "ana@example.com")]),
            disabled,
        );

        assert!(sync.execute_sync().await.is_none());
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    }

    /// Fetcher that parks on the first page until released, to hold a run
    /// open while a second trigger arrives.
    struct ParkedFetcher {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl OrderPageFetcher for ParkedFetcher {
        async fn fetch_page(&self, _page: u32, _per_page: u32) -> Result<OrderPage, SyncError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(OrderPage {
                orders: Vec::new(),
                total_pages: 1,
            })
        }
    }

    #[tokio::test]
    async fn test_overlapping_triggers_run_once() {
        let store = Arc::new(MockStore::default());
        let fetcher = Arc::new(ParkedFetcher {
            entered: Notify::new(),
            release: Notify::new(),
        });

        let sync = Arc::new(WooCustomerSync::new(store, fetcher.clone(), settings()));

        let first = {
            let sync = Arc::clone(&sync);
            tokio::spawn(async move { sync.execute_sync().await })
        };
        fetcher.entered.notified().await;

        // Second trigger while the first is parked inside its run.
        assert!(sync.execute_sync().await.is_none());

        fetcher.release.notify_one();
        let report = first.await.expect("task completes");
        assert!(report.is_some());
    }
}
