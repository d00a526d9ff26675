//! WooCommerce integration: order fetch and customer synchronization

pub mod client;
pub mod customer_sync;
pub mod source;

pub use client::{OrderPage, WooClient, WooClientConfig};
pub use customer_sync::WooCustomerSync;
pub use source::{OrderPageFetcher, RemoteOrderSource};
