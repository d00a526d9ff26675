//! Phone normalization
//!
//! Commerce platforms deliver billing phones in whatever format the shopper
//! typed. The store expects a single `+<country code><digits>` form so that
//! equality checks during sync do not flag cosmetic differences as changes.

use crate::constants::DEFAULT_COUNTRY_CALLING_CODE;

/// Normalize a billing phone to a `+57...`-style form.
///
/// Strips spaces and a leading `+`, removes one leading instance of the
/// default country calling code when already present, then prepends
/// `+<default code>`. Idempotent under reformatting; an empty input stays
/// empty.
pub fn normalize_phone(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return String::new();
    }

    let digits = compact.strip_prefix('+').unwrap_or(&compact);
    let national = digits.strip_prefix(DEFAULT_COUNTRY_CALLING_CODE).unwrap_or(digits);

    format!("+{DEFAULT_COUNTRY_CALLING_CODE}{national}")
}
