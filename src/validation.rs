//! # Validation Module
//!
//! Shape checks for user-supplied form fields.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

/// Email shape: local part, `@`, domain, and an alphabetic final label of two or more letters.
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

lazy_static! {
    pub static ref EMAIL_REGEX: Regex =
        Regex::new(EMAIL_PATTERN).expect("Email pattern should be valid");
}

/// Check whether the input looks like an email address.
///
/// This is a shape check only; no mailbox or DNS lookup happens.
pub fn is_valid_email(input: &str) -> bool {
    EMAIL_REGEX.is_match(input)
}

/// Validate an email input, returning it unchanged when accepted
pub fn validate_email(input: &str) -> Result<&str, ValidationError> {
    if is_valid_email(input) {
        Ok(input)
    } else {
        Err(ValidationError::MalformedEmail(input.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_well_formed_addresses() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(is_valid_email("user_name%x@sub-domain.example.museum"));
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("ana@example.c"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@.com"));
        assert!(!is_valid_email("ana@example.c0m"));
        assert!(!is_valid_email("ana example@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_no_trimming() {
        assert!(!is_valid_email(" ana@example.com"));
        assert!(!is_valid_email("ana@example.com "));
    }

    #[test]
    fn test_validate_email_returns_input() {
        assert_eq!(validate_email("ana@example.com"), Ok("ana@example.com"));
        assert_eq!(
            validate_email("a@b"),
            Err(ValidationError::MalformedEmail("a@b".to_string()))
        );
    }
}
