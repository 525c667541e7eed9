//! Human-readable byte quantities ("10MB", "1.5 GiB", "500").
//!
//! Follows the usual backup-framework convention: strip everything that is
//! not a digit or a dot to get the number, and use the first unit letter
//! (`b k m g t p e z y`, case-insensitive) as a power of 1024.

/// Attachment limit used when none is configured or it cannot be parsed.
pub const DEFAULT_MAX_SIZE: &str = "10MB";

/// [`DEFAULT_MAX_SIZE`] in bytes.
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

const UNITS: &str = "bkmgtpezy";

/// Parse a size string into bytes, rounding to the nearest byte.
///
/// Returns `None` when the string carries no number at all. Quantities too
/// large for `u64` saturate.
pub fn parse_size(raw: &str) -> Option<u64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let number: f64 = digits.parse().ok()?;

    let exponent = raw
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .find_map(|c| UNITS.find(c))
        .unwrap_or(0);

    let bytes = number * 1024f64.powi(exponent as i32);
    Some(bytes.round() as u64)
}

/// Parse an optional configured limit, falling back to 10 MiB.
///
/// A literal `"0"` counts as unset, like an empty string.
pub fn max_size_bytes(configured: Option<&str>) -> u64 {
    configured
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "0")
        .and_then(parse_size)
        .unwrap_or(DEFAULT_MAX_SIZE_BYTES)
}
