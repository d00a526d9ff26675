//! WooCommerce REST API client
//!
//! Thin HTTP adapter over the store's `/wp-json/wc/v3` endpoints. All
//! failures are classified into the typed [`SyncError`] set at this edge so
//! callers never inspect status codes themselves.

use std::time::Duration;

use reqwest::Response;
use tracing::{debug, instrument, warn};

use storelink_domain::{RemoteOrder, WooCommerceConfig};

use crate::sync::SyncError;

/// Response header carrying the total page count for a collection.
const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

/// How much of an error body to keep in the error message.
const ERROR_BODY_EXCERPT_LEN: usize = 200;

/// Configuration for the WooCommerce client
#[derive(Debug, Clone)]
pub struct WooClientConfig {
    /// Store base URL, e.g. "https://shop.example.com"
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Timeout for API requests
    pub timeout: Duration,
}

impl WooClientConfig {
    pub fn from_settings(settings: &WooCommerceConfig) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            consumer_key: settings.consumer_key.clone(),
            consumer_secret: settings.consumer_secret.clone(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// One page of orders plus the collection's reported page count.
#[derive(Debug, Clone)]
pub struct OrderPage {
    pub orders: Vec<RemoteOrder>,
    pub total_pages: u32,
}

/// WooCommerce REST API client
pub struct WooClient {
    http: reqwest::Client,
    config: WooClientConfig,
}

impl WooClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the underlying HTTP client cannot be
    /// built.
    pub fn new(config: WooClientConfig) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn orders_url(&self) -> String {
        format!(
            "{}/wp-json/wc/v3/orders",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Issue a GET against the orders collection with the given extra query
    /// parameters, classifying any failure.
    async fn get_orders(&self, query: &[(&str, String)]) -> Result<Response, SyncError> {
        let url = self.orders_url();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("consumer_key", self.config.consumer_key.as_str()),
                ("consumer_secret", self.config.consumer_secret.as_str()),
            ])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT_LEN).collect();
        warn!(status = %status, "WooCommerce request failed");
        Err(SyncError::from_status(status, excerpt))
    }

    /// Fetch one page of orders.
    ///
    /// The total page count comes from the `X-WP-TotalPages` response
    /// header; a missing or malformed header is treated as a single page.
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, page: u32, per_page: u32) -> Result<OrderPage, SyncError> {
        let response = self
            .get_orders(&[("page", page.to_string()), ("per_page", per_page.to_string())])
            .await?;

        let total_pages = response
            .headers()
            .get(TOTAL_PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let orders: Vec<RemoteOrder> = response
            .json()
            .await
            .map_err(|e| SyncError::Unknown(format!("Failed to parse orders page: {e}")))?;

        debug!(page, count = orders.len(), total_pages, "Fetched orders page");

        Ok(OrderPage {
            orders,
            total_pages,
        })
    }

    /// Fetch the orders whose billing email matches `email`, via the
    /// collection search parameter.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn fetch_orders_by_email(&self, email: &str) -> Result<Vec<RemoteOrder>, SyncError> {
        let response = self
            .get_orders(&[("search", email.to_string())])
            .await?;

        let orders: Vec<RemoteOrder> = response
            .json()
            .await
            .map_err(|e| SyncError::Unknown(format!("Failed to parse order search: {e}")))?;

        debug!(count = orders.len(), "Fetched orders by email");
        Ok(orders)
    }

    /// One cheap round trip to verify the credentials work.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> Result<(), SyncError> {
        self.get_orders(&[("per_page", "1".to_string())]).await?;
        Ok(())
    }
}
