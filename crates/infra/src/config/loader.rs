//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `STORELINK_WOO_BASE_URL`: WooCommerce store base URL
//! - `STORELINK_WOO_CONSUMER_KEY`: WooCommerce consumer key
//! - `STORELINK_WOO_CONSUMER_SECRET`: WooCommerce consumer secret
//! - `STORELINK_WOO_ENABLED`: Whether customer sync is enabled (true/false)
//! - `STORELINK_WOO_CRON`: Customer sync cron expression
//! - `STORELINK_WOO_PER_PAGE`: Orders fetched per page
//! - `STORELINK_CHATWOOT_BASE_URL`: Chatwoot API base URL
//! - `STORELINK_CHATWOOT_API_TOKEN`: Chatwoot API access token
//! - `STORELINK_CHATWOOT_ACCOUNT_ID`: Chatwoot account id
//! - `STORELINK_CHATWOOT_ENABLED`: Whether contact push is enabled (true/false)
//! - `STORELINK_CHATWOOT_CRON`: Contact push cron expression
//! - `STORELINK_CHATWOOT_PUSH_CONCURRENCY`: Max concurrent pushes
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./storelink.json` or `./storelink.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use storelink_domain::constants::{DEFAULT_ORDERS_PER_PAGE, DEFAULT_PUSH_CONCURRENCY};
use storelink_domain::{ChatwootConfig, Config, Result, StorelinkError, WooCommerceConfig};

const DEFAULT_CUSTOMER_SYNC_CRON: &str = "0 0 * * * *";
const DEFAULT_CONTACT_PUSH_CRON: &str = "0 30 * * * *";

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `StorelinkError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The credential variables for both integrations must be present; the
/// enablement, cron, and tuning variables fall back to defaults.
///
/// # Errors
/// Returns `StorelinkError::Config` if required variables are missing or
/// have invalid values.
pub fn load_from_env() -> Result<Config> {
    let woo_base_url = env_var("STORELINK_WOO_BASE_URL")?;
    let woo_consumer_key = env_var("STORELINK_WOO_CONSUMER_KEY")?;
    let woo_consumer_secret = env_var("STORELINK_WOO_CONSUMER_SECRET")?;
    let woo_enabled = env_bool("STORELINK_WOO_ENABLED", true);
    let woo_cron = std::env::var("STORELINK_WOO_CRON")
        .unwrap_or_else(|_| DEFAULT_CUSTOMER_SYNC_CRON.to_string());
    let woo_per_page = env_parse("STORELINK_WOO_PER_PAGE", DEFAULT_ORDERS_PER_PAGE)?;

    let cw_base_url = env_var("STORELINK_CHATWOOT_BASE_URL")?;
    let cw_api_token = env_var("STORELINK_CHATWOOT_API_TOKEN")?;
    let cw_account_id = env_var("STORELINK_CHATWOOT_ACCOUNT_ID").and_then(|s| {
        s.parse::<u64>()
            .map_err(|e| StorelinkError::Config(format!("Invalid account id: {e}")))
    })?;
    let cw_enabled = env_bool("STORELINK_CHATWOOT_ENABLED", true);
    let cw_cron = std::env::var("STORELINK_CHATWOOT_CRON")
        .unwrap_or_else(|_| DEFAULT_CONTACT_PUSH_CRON.to_string());
    let cw_concurrency =
        env_parse("STORELINK_CHATWOOT_PUSH_CONCURRENCY", DEFAULT_PUSH_CONCURRENCY)?;

    Ok(Config {
        woocommerce: WooCommerceConfig {
            base_url: woo_base_url,
            consumer_key: woo_consumer_key,
            consumer_secret: woo_consumer_secret,
            enabled: woo_enabled,
            cron_schedule: woo_cron,
            per_page: woo_per_page,
        },
        chatwoot: ChatwootConfig {
            base_url: cw_base_url,
            api_token: cw_api_token,
            account_id: cw_account_id,
            enabled: cw_enabled,
            cron_schedule: cw_cron,
            push_concurrency: cw_concurrency,
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `StorelinkError::Config` if no file is found or it fails to
/// parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(StorelinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            StorelinkError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| StorelinkError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| StorelinkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| StorelinkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(StorelinkError::Config(format!(
            "Unsupported config format: {extension}"
        ))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("storelink.json"),
            cwd.join("storelink.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("storelink.json"),
                exe_dir.join("storelink.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        StorelinkError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse a numeric environment variable, with a default when unset.
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| StorelinkError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
