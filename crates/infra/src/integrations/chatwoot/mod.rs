//! Chatwoot integration: outbound contact push

pub mod client;
pub mod push;

pub use client::{ChatwootClient, ChatwootClientConfig, ChatwootContact};
pub use push::{ContactPush, ContactPusher, PushOutcome};
