//! Order-to-contact mapping
//!
//! Pure transformation from a remote order's billing data into the contact
//! shape the store accepts, plus the change check that decides whether an
//! existing contact needs an update. Mapping is total: anything that cannot
//! be mapped yields `None` (skip the record), never an error.

use tracing::debug;

use crate::constants::{BILLING_DOCUMENT_META_KEY, DEFAULT_DOCUMENT_TYPE};
use crate::types::{Contact, ContactDraft, RemoteOrder};
use crate::utils::phone::normalize_phone;

/// Map a remote order to a contact draft.
///
/// Returns `None` when the billing email is empty, or when both first and
/// last name are missing. The document number is taken from the
/// `_billing_document` metadata entry; when present, the document type
/// defaults to the local citizen-ID type, otherwise both document fields are
/// omitted. The email is lower-cased and the phone normalized.
pub fn map_order_to_contact(order: &RemoteOrder) -> Option<ContactDraft> {
    let billing = &order.billing;

    let email = billing.email.trim().to_lowercase();
    if email.is_empty() {
        debug!(order_id = order.id, "order has no billing email; skipping");
        return None;
    }

    let first_name = non_empty(&billing.first_name);
    let last_name = non_empty(&billing.last_name);
    if first_name.is_none() && last_name.is_none() {
        debug!(order_id = order.id, "order has no billing names; skipping");
        return None;
    }

    let (document_type, document_number) = match order.meta_value(BILLING_DOCUMENT_META_KEY) {
        Some(document) => (Some(DEFAULT_DOCUMENT_TYPE.to_string()), Some(document.to_string())),
        None => (None, None),
    };

    let phone = non_empty(&billing.phone).map(|p| normalize_phone(&p));

    Some(ContactDraft {
        document_type,
        document_number,
        first_name,
        last_name,
        email,
        phone,
        address: non_empty(&billing.address_1),
        address_extra: non_empty(&billing.address_2),
        city_code: non_empty(&billing.city),
    })
}

/// True when the mapped draft differs from the stored contact on any of the
/// compared fields: first/last name, email, phone, address, address_extra,
/// city_code. Document identity is excluded from the diff; it is assumed
/// immutable once set.
pub fn has_contact_changed(existing: &Contact, mapped: &ContactDraft) -> bool {
    existing.first_name != mapped.first_name
        || existing.last_name != mapped.last_name
        || existing.email != mapped.email
        || existing.phone != mapped.phone
        || existing.address != mapped.address
        || existing.address_extra != mapped.address_extra
        || existing.city_code != mapped.city_code
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
