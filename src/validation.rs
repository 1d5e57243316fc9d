//! Format checks for phone numbers and emails.

use crate::core::{DirectoryError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Eleven ASCII digits, optionally preceded by '+'.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{11}$").unwrap());

/// Returns true if `phone`, after trimming whitespace, is 11 digits or '+'
/// followed by 11 digits.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

/// Returns true if `email` contains '@' and the part after the last '@'
/// contains '.'.
///
/// This is a permissive sanity check, not RFC 5322 validation.
pub fn is_valid_email(email: &str) -> bool {
    email
        .rsplit_once('@')
        .map_or(false, |(_, domain)| domain.contains('.'))
}

/// Validates a phone, returning `DirectoryError::InvalidPhone` on failure.
pub fn validate_phone(phone: &str) -> Result<()> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        Err(DirectoryError::InvalidPhone(phone.to_string()))
    }
}

/// Validates an email, returning `DirectoryError::InvalidEmail` on failure.
pub fn validate_email(email: &str) -> Result<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(DirectoryError::InvalidEmail(email.to_string()))
    }
}
