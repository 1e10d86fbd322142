//! Identifier policy for application names and agent ids.
//!
//! An id is accepted when it is non-empty, no longer than the given maximum,
//! and consists only of ASCII letters, ASCII digits, `.`, `-` and `_`.
//!
//! Length is measured in UTF-8 bytes, the unit the collector stores. For the
//! ASCII ids the policy admits this equals the character count.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Maximum length of an application name or agent id.
pub const MAX_ID_LENGTH: usize = 24;

static ID_CHARS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("Invalid id regex"));

/// Why an id was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRejection {
    /// The value is empty.
    Empty,
    /// The value exceeds the maximum length.
    TooLong,
    /// The value contains a character outside the policy.
    IllegalChar,
}

impl IdRejection {
    /// Stable machine-readable reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdRejection::Empty => "empty",
            IdRejection::TooLong => "too_long",
            IdRejection::IllegalChar => "illegal_char",
        }
    }
}

impl fmt::Display for IdRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective length of `value` in UTF-8 bytes.
pub fn length(value: &str) -> usize {
    value.len()
}

/// Check `value` against the id policy.
pub fn validate(value: &str, max_length: usize) -> Result<(), IdRejection> {
    if value.is_empty() {
        return Err(IdRejection::Empty);
    }
    if length(value) > max_length {
        return Err(IdRejection::TooLong);
    }
    if !ID_CHARS_REGEX.is_match(value) {
        return Err(IdRejection::IllegalChar);
    }
    Ok(())
}

/// Convenience wrapper around [`validate`].
pub fn is_valid(value: &str, max_length: usize) -> bool {
    validate(value, max_length).is_ok()
}

/// Leading part of `value` at most `max_units` bytes long.
///
/// Never splits a character; a multi-byte character straddling the limit is
/// dropped.
pub fn truncate(value: &str, max_units: usize) -> &str {
    if value.len() <= max_units {
        return value;
    }
    let mut end = max_units;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Trailing part of `value` at most `max_units` bytes long.
pub fn tail(value: &str, max_units: usize) -> &str {
    if value.len() <= max_units {
        return value;
    }
    let mut start = value.len() - max_units;
    while !value.is_char_boundary(start) {
        start += 1;
    }
    &value[start..]
}
