//! External platform integrations

pub mod chatwoot;
pub mod woocommerce;
