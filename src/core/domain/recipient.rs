//! Recipient list parsing.
//!
//! Recipients are configured as one comma-separated string.

use crate::core::types::EmailAddress;

/// Split a comma-separated recipient list.
///
/// Whitespace around each address is trimmed and empty entries are
/// dropped. Order is preserved. Addresses are not validated here; the
/// service rejects malformed ones when they are added.
pub fn parse_recipients(list: &str) -> Vec<EmailAddress> {
    list.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}
