//! Error types for the sync engine
//!
//! Every remote failure crossing into the orchestrators is one of these
//! variants. The client adapters classify HTTP status codes at the edge so
//! the engine can match on variants instead of probing status codes.

use reqwest::StatusCode;
use storelink_domain::StorelinkError;
use thiserror::Error;

/// Sync engine errors
#[derive(Debug, Error)]
pub enum SyncError {
    /// Remote returned 429; the retry policy backs off on this variant only
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Unique-key violation, e.g. two writers racing on the same email
    #[error("Duplicate key: {0}")]
    Conflict(String),

    /// Resource does not exist on the remote
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials rejected (401/403)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure (connect, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// Integration is missing required settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything the adapter could not classify
    #[error("Sync error: {0}")]
    Unknown(String),
}

/// Coarse error category, used for log fields and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorCategory {
    RateLimit,
    Conflict,
    NotFound,
    Auth,
    Network,
    Config,
    Unknown,
}

impl SyncError {
    /// Classify an HTTP error status into a typed variant.
    ///
    /// `detail` carries the operation context ("create contact", the
    /// response body excerpt, ...) so the message stays actionable.
    pub fn from_status(status: StatusCode, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(detail),
            StatusCode::CONFLICT => Self::Conflict(detail),
            StatusCode::NOT_FOUND => Self::NotFound(detail),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth(detail),
            _ => Self::Unknown(format!("HTTP {status}: {detail}")),
        }
    }

    pub fn category(&self) -> SyncErrorCategory {
        match self {
            Self::RateLimited(_) => SyncErrorCategory::RateLimit,
            Self::Conflict(_) => SyncErrorCategory::Conflict,
            Self::NotFound(_) => SyncErrorCategory::NotFound,
            Self::Auth(_) => SyncErrorCategory::Auth,
            Self::Network(_) => SyncErrorCategory::Network,
            Self::Config(_) => SyncErrorCategory::Config,
            Self::Unknown(_) => SyncErrorCategory::Unknown,
        }
    }

    /// Whether the retry policy should back off and try again.
    pub fn should_retry(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<StorelinkError> for SyncError {
    fn from(err: StorelinkError) -> Self {
        match err {
            StorelinkError::RateLimited(msg) => Self::RateLimited(msg),
            StorelinkError::Conflict(msg) => Self::Conflict(msg),
            StorelinkError::NotFound(msg) => Self::NotFound(msg),
            StorelinkError::Auth(msg) => Self::Auth(msg),
            StorelinkError::Network(msg) => Self::Network(msg),
            StorelinkError::Config(msg) => Self::Config(msg),
            other => Self::Unknown(other.to_string()),
        }
    }
}
