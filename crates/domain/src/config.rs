//! Configuration structures
//!
//! Deserialized by the infra config loader from environment variables or a
//! JSON/TOML file. Each integration carries its own enablement flag and
//! credentials; `is_configured` decides whether the sync engine treats the
//! integration as present at all.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ORDERS_PER_PAGE, DEFAULT_PUSH_CONCURRENCY};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub woocommerce: WooCommerceConfig,
    pub chatwoot: ChatwootConfig,
}

/// WooCommerce integration settings (customer pull).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooCommerceConfig {
    /// Store base URL, e.g. `https://shop.example.com`.
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Master switch for the customer sync job.
    pub enabled: bool,
    /// Cron expression driving the periodic sync.
    pub cron_schedule: String,
    /// Orders fetched per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Chatwoot integration settings (contact push).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatwootConfig {
    /// API base URL, e.g. `https://chatwoot.example.com`.
    pub base_url: String,
    pub api_token: String,
    pub account_id: u64,
    /// Master switch for the contact push job.
    pub enabled: bool,
    /// Cron expression driving the periodic push.
    pub cron_schedule: String,
    /// Maximum concurrent in-flight pushes.
    #[serde(default = "default_push_concurrency")]
    pub push_concurrency: usize,
}

impl WooCommerceConfig {
    /// All required credentials present.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
            && !self.consumer_key.trim().is_empty()
            && !self.consumer_secret.trim().is_empty()
    }
}

impl ChatwootConfig {
    /// All required credentials present.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.api_token.trim().is_empty() && self.account_id > 0
    }
}

fn default_per_page() -> u32 {
    DEFAULT_ORDERS_PER_PAGE
}

fn default_push_concurrency() -> usize {
    DEFAULT_PUSH_CONCURRENCY
}
