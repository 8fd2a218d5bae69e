// SPDX-License-Identifier: Apache-2.0

//! Input validation for request parameters.
//!
//! The host value is matched against a strict allow-pattern before it may
//! reach the process launcher: a bounded-length string of hostname/IP
//! characters only. Anything that does not fully match is rejected, rather
//! than filtering out a blocklist of known-bad characters.
//!
//! The user value is bound as an opaque data parameter by the store, so its
//! content is unrestricted; only its length is bounded.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DiagError;

/// Allow-pattern for hostnames and IP addresses: alphanumerics, dots and
/// hyphens, starting with an alphanumeric. Anchored on both ends.
static HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.-]*$").expect("host allow-pattern is a valid regex")
});

/// Validates a host parameter against the allow-pattern.
///
/// Shell metacharacters, whitespace, path separators and anything else
/// outside the hostname/IP character set fail the full match. Consecutive
/// dots are rejected separately since the pattern admits them.
///
/// # Errors
///
/// Returns [`DiagError::ValidationRejected`] if the value is empty, exceeds
/// `max_len` characters, or does not fully match the allow-pattern. No
/// process is launched for a rejected value.
pub fn validate_host(raw: &str, max_len: usize) -> Result<(), DiagError> {
    if raw.is_empty() {
        return Err(rejected("host is empty"));
    }
    if raw.chars().count() > max_len {
        return Err(rejected(format!(
            "host exceeds {max_len} characters"
        )));
    }
    if !HOST_PATTERN.is_match(raw) {
        return Err(rejected("host contains characters outside [A-Za-z0-9.-]"));
    }
    if raw.contains("..") || raw.ends_with('.') {
        return Err(rejected("host has an empty label"));
    }
    Ok(())
}

/// Validates a user parameter.
///
/// The value is later bound as data, never interpreted, so only the length
/// bound applies.
///
/// # Errors
///
/// Returns [`DiagError::ValidationRejected`] if the value exceeds `max_len`
/// characters.
pub fn validate_user(raw: &str, max_len: usize) -> Result<(), DiagError> {
    if raw.chars().count() > max_len {
        return Err(rejected(format!(
            "user exceeds {max_len} characters"
        )));
    }
    Ok(())
}

fn rejected(reason: impl Into<String>) -> DiagError {
    DiagError::ValidationRejected {
        reason: reason.into(),
    }
}
