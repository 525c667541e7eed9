//! Recipient list parsing and address syntax checks.

use email_address::EmailAddress;

/// Split a comma-separated recipient string into trimmed, non-empty addresses.
///
/// Order is preserved and empty segments are dropped. No validation happens
/// here; garbage input simply yields garbage tokens for [`is_valid_address`]
/// to reject later.
///
/// # Examples
/// - `"a@x.com, b@y.com ,, c@z.com"` → `["a@x.com", "b@y.com", "c@z.com"]`
/// - `" , ,"` → `[]`
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Syntactic check of a bare `user@domain` address.
///
/// Display-name forms (`"Name <user@domain>"`) are rejected: the destination
/// only accepts plain addresses.
pub fn is_valid_address(address: &str) -> bool {
    !address.contains('<') && EmailAddress::is_valid(address)
}

/// Return the first address in `addresses` that fails [`is_valid_address`].
pub fn first_invalid<'a>(addresses: &'a [String]) -> Option<&'a str> {
    addresses
        .iter()
        .map(String::as_str)
        .find(|addr| !is_valid_address(addr))
}
