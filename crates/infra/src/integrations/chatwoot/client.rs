//! Chatwoot API client
//!
//! Adapter over the Chatwoot account-scoped contacts API. Authenticates with
//! the `api_access_token` header and classifies failures into the typed
//! [`SyncError`] set, same as the order-side client.

use std::time::Duration;

use reqwest::Response;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use storelink_domain::{ChatwootConfig, Contact};

use crate::sync::SyncError;

const ERROR_BODY_EXCERPT_LEN: usize = 200;

/// Configuration for the Chatwoot client
#[derive(Debug, Clone)]
pub struct ChatwootClientConfig {
    /// API base URL, e.g. "https://chatwoot.example.com"
    pub base_url: String,
    pub api_token: String,
    pub account_id: u64,
    /// Timeout for API requests
    pub timeout: Duration,
}

impl ChatwootClientConfig {
    pub fn from_settings(settings: &ChatwootConfig) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            api_token: settings.api_token.clone(),
            account_id: settings.account_id,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Contact record as returned by the Chatwoot API. Only the fields the sync
/// engine needs are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatwootContact {
    pub id: u64,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    payload: Vec<ChatwootContact>,
}

#[derive(Debug, Serialize)]
struct ContactPayload {
    name: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
}

impl ContactPayload {
    fn from_contact(contact: &Contact) -> Self {
        let name = [contact.first_name.as_deref(), contact.last_name.as_deref()]
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            name,
            email: contact.email.clone(),
            phone_number: contact.phone.clone(),
            identifier: contact.document_number.clone(),
        }
    }
}

/// Chatwoot contacts API client
pub struct ChatwootClient {
    http: reqwest::Client,
    config: ChatwootClientConfig,
}

impl ChatwootClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the underlying HTTP client cannot be
    /// built.
    pub fn new(config: ChatwootClientConfig) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn contacts_url(&self) -> String {
        format!(
            "{}/api/v1/accounts/{}/contacts",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_id
        )
    }

    async fn check(&self, response: Response) -> Result<Response, SyncError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT_LEN).collect();
        warn!(status = %status, "Chatwoot request failed");
        Err(SyncError::from_status(status, excerpt))
    }

    /// Find the contact with exactly this email, if any.
    ///
    /// The search endpoint matches fuzzily, so results are filtered down to
    /// an exact (case-insensitive) email match.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn search_contact(&self, email: &str) -> Result<Option<ChatwootContact>, SyncError> {
        let url = format!("{}/search", self.contacts_url());

        let response = self
            .http
            .get(&url)
            .header("api_access_token", &self.config.api_token)
            .query(&[("q", email)])
            .send()
            .await?;
        let response = self.check(response).await?;

        let result: SearchResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Unknown(format!("Failed to parse contact search: {e}")))?;

        let needle = email.to_lowercase();
        let found = result.payload.into_iter().find(|c| {
            c.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(&needle))
        });

        debug!(found = found.is_some(), "Contact search complete");
        Ok(found)
    }

    /// Create a contact in the account.
    #[instrument(skip(self, contact), fields(email = %contact.email))]
    pub async fn create_contact(&self, contact: &Contact) -> Result<(), SyncError> {
        let response = self
            .http
            .post(self.contacts_url())
            .header("api_access_token", &self.config.api_token)
            .json(&ContactPayload::from_contact(contact))
            .send()
            .await?;
        self.check(response).await?;

        debug!("Contact created in Chatwoot");
        Ok(())
    }

    /// Update an existing contact by its Chatwoot id.
    #[instrument(skip(self, contact), fields(email = %contact.email, chatwoot_id = id))]
    pub async fn update_contact(&self, id: u64, contact: &Contact) -> Result<(), SyncError> {
        let url = format!("{}/{id}", self.contacts_url());

        let response = self
            .http
            .put(&url)
            .header("api_access_token", &self.config.api_token)
            .json(&ContactPayload::from_contact(contact))
            .send()
            .await?;
        self.check(response).await?;

        debug!("Contact updated in Chatwoot");
        Ok(())
    }
}
