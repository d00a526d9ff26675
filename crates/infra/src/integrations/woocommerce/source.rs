//! Paginated order source
//!
//! Wraps an [`OrderPageFetcher`] (in production, [`WooClient`]) and exposes
//! the order collection two ways: a bulk accumulator and a lazy page stream.
//! The two have deliberately different failure behavior: bulk fetching is
//! best-effort and degrades to the pages already collected, while stream
//! consumers see fetch errors as stream items and handle them page by page.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, instrument, warn};

use storelink_domain::RemoteOrder;
use storelink_domain::WooCommerceConfig;

use crate::sync::SyncError;

use super::client::{OrderPage, WooClient, WooClientConfig};

/// Remote order access seam, so orchestration can be tested without HTTP.
#[async_trait]
pub trait OrderPageFetcher: Send + Sync {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<OrderPage, SyncError>;

    /// Targeted fetch backing the manual per-email sync. Sources without
    /// search support yield nothing.
    async fn fetch_by_email(&self, _email: &str) -> Result<Vec<RemoteOrder>, SyncError> {
        Ok(Vec::new())
    }

    /// One cheap round trip proving the source is reachable.
    async fn test_connection(&self) -> Result<(), SyncError> {
        Ok(())
    }
}

#[async_trait]
impl OrderPageFetcher for WooClient {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<OrderPage, SyncError> {
        WooClient::fetch_page(self, page, per_page).await
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Vec<RemoteOrder>, SyncError> {
        WooClient::fetch_orders_by_email(self, email).await
    }

    async fn test_connection(&self) -> Result<(), SyncError> {
        WooClient::test_connection(self).await
    }
}

/// Order collection view over a configured (or absent) remote store.
///
/// An unconfigured integration yields no orders from either access form
/// rather than erroring, so a host without WooCommerce credentials simply
/// has nothing to sync.
pub struct RemoteOrderSource {
    fetcher: Option<Arc<dyn OrderPageFetcher>>,
}

impl RemoteOrderSource {
    pub fn new(fetcher: Arc<dyn OrderPageFetcher>) -> Self {
        Self {
            fetcher: Some(fetcher),
        }
    }

    /// Source with no backing store; emits nothing.
    pub fn disabled() -> Self {
        Self { fetcher: None }
    }

    /// Build from integration settings, disabled when credentials are
    /// incomplete.
    pub fn from_settings(settings: &WooCommerceConfig) -> Result<Self, SyncError> {
        if !settings.is_configured() {
            debug!("WooCommerce not configured, order source disabled");
            return Ok(Self::disabled());
        }
        let client = WooClient::new(WooClientConfig::from_settings(settings))?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Fetch orders eagerly.
    ///
    /// With `page` given, exactly that page is fetched and its failure
    /// propagates. Without it, all pages are accumulated sequentially,
    /// driven by the page count reported with page 1; a mid-loop failure
    /// logs and returns what was collected so far.
    #[instrument(skip(self))]
    pub async fn get_orders(
        &self,
        page: Option<u32>,
        per_page: u32,
    ) -> Result<Vec<RemoteOrder>, SyncError> {
        let Some(fetcher) = &self.fetcher else {
            return Ok(Vec::new());
        };

        if let Some(page) = page {
            return Ok(fetcher.fetch_page(page, per_page).await?.orders);
        }

        let mut orders = Vec::new();
        let mut current = 1u32;
        let mut total_pages = 1u32;

        loop {
            match fetcher.fetch_page(current, per_page).await {
                Ok(fetched) => {
                    if current == 1 {
                        total_pages = fetched.total_pages.max(1);
                    }
                    orders.extend(fetched.orders);
                }
                Err(err) => {
                    warn!(
                        page = current,
                        error = %err,
                        "Order page fetch failed, returning orders collected so far"
                    );
                    break;
                }
            }

            if current >= total_pages {
                break;
            }
            current += 1;
        }

        debug!(count = orders.len(), "Bulk order fetch complete");
        Ok(orders)
    }

    /// Lazy, single-pass stream of order pages.
    ///
    /// The next page is fetched only when the previous item has been
    /// consumed; the stream ends at the page count reported with page 1.
    /// Fetch errors surface as stream items.
    pub fn order_stream(
        &self,
        per_page: u32,
    ) -> BoxStream<'static, Result<Vec<RemoteOrder>, SyncError>> {
        let Some(fetcher) = self.fetcher.clone() else {
            return stream::empty().boxed();
        };

        stream::try_unfold(
            (1u32, None::<u32>),
            move |(page, known_total)| {
                let fetcher = Arc::clone(&fetcher);
                async move {
                    if let Some(total) = known_total {
                        if page > total {
                            return Ok(None);
                        }
                    }

                    let fetched = fetcher.fetch_page(page, per_page).await?;
                    // Page count is pinned from the first response so a
                    // shifting remote count cannot make the stream endless.
                    let total = known_total.unwrap_or_else(|| fetched.total_pages.max(1));
                    Ok(Some((fetched.orders, (page + 1, Some(total)))))
                }
            },
        )
        .boxed()
    }
}
