//! Remote order types
//!
//! Records fetched from an external commerce platform. Immutable, sourced
//! externally, never persisted directly.

use serde::{Deserialize, Serialize};

/// Order record as returned by the commerce platform API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub id: u64,
    pub billing: BillingAddress,
    /// Free-form key/value metadata attached to the order.
    #[serde(default)]
    pub meta_data: Vec<OrderMeta>,
}

/// Billing sub-record of a remote order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub address_2: String,
    #[serde(default)]
    pub city: String,
}

/// Key/value metadata entry on a remote order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderMeta {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl RemoteOrder {
    /// Look up a metadata value by key. Returns the first match, trimmed;
    /// empty values count as absent.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta_data
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.value.trim())
            .filter(|v| !v.is_empty())
    }
}
