//! Domain type modules

pub mod contact;
pub mod order;
pub mod stats;

pub use contact::{Contact, ContactDraft, ContactPage};
pub use order::{BillingAddress, OrderMeta, RemoteOrder};
pub use stats::SyncStats;
