//! Port interfaces for sync gating

use storelink_domain::{ChatwootConfig, WooCommerceConfig};

/// Feature-flag view of an integration's sync settings.
///
/// Orchestrators consult this before doing any work: a disabled or
/// unconfigured integration turns the sync trigger into a no-op instead of
/// an error.
pub trait SyncSettings: Send + Sync {
    /// Master switch for the sync job.
    fn is_enabled(&self) -> bool;

    /// All required credentials present.
    fn is_configured(&self) -> bool;

    /// Cron expression driving the periodic trigger.
    fn cron_schedule(&self) -> &str;
}

impl SyncSettings for WooCommerceConfig {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_configured(&self) -> bool {
        WooCommerceConfig::is_configured(self)
    }

    fn cron_schedule(&self) -> &str {
        &self.cron_schedule
    }
}

impl SyncSettings for ChatwootConfig {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_configured(&self) -> bool {
        ChatwootConfig::is_configured(self)
    }

    fn cron_schedule(&self) -> &str {
        &self.cron_schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn woo_config(consumer_secret: &str) -> WooCommerceConfig {
        WooCommerceConfig {
            base_url: "https://shop.example.com".to_string(),
            consumer_key: "ck".to_string(),
            consumer_secret: consumer_secret.to_string(),
            enabled: true,
            cron_schedule: "0 0 * * * *".to_string(),
            per_page: 100,
        }
    }

    fn chatwoot_config(account_id: u64) -> ChatwootConfig {
        ChatwootConfig {
            base_url: "https://chatwoot.example.com".to_string(),
            api_token: "token".to_string(),
            account_id,
            enabled: false,
            cron_schedule: "0 30 * * * *".to_string(),
            push_concurrency: 10,
        }
    }

    #[test]
    fn woocommerce_config_gates_through_port() {
        let settings = woo_config("cs");
        let view: &dyn SyncSettings = &settings;
        assert!(view.is_enabled());
        assert!(view.is_configured());
        assert_eq!(view.cron_schedule(), "0 0 * * * *");

        let incomplete = woo_config("");
        let view: &dyn SyncSettings = &incomplete;
        assert!(!view.is_configured());
    }

    #[test]
    fn chatwoot_config_gates_through_port() {
        let settings = chatwoot_config(7);
        let view: &dyn SyncSettings = &settings;
        assert!(!view.is_enabled());
        assert!(view.is_configured());
        assert_eq!(view.cron_schedule(), "0 30 * * * *");

        let missing_account = chatwoot_config(0);
        let view: &dyn SyncSettings = &missing_account;
        assert!(!view.is_configured());
    }
}
