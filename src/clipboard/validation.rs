//! Practical email-address grammar applied before any copy attempt.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::CopyError;

/// Longest address accepted (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(
            r#"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"#,
        )
        .unwrap()
    })
}

pub fn is_valid_email(text: &str) -> bool {
    text.len() <= MAX_EMAIL_LENGTH && email_regex().is_match(text)
}

/// Fail with `InvalidInput` unless `text` is a plausible email address.
pub fn validate_email(text: &str) -> Result<(), CopyError> {
    if text.len() > MAX_EMAIL_LENGTH {
        return Err(CopyError::InvalidInput(format!(
            "address is {} characters, limit is {}",
            text.len(),
            MAX_EMAIL_LENGTH
        )));
    }
    if !email_regex().is_match(text) {
        return Err(CopyError::InvalidInput(format!("'{}' is not an email address", text)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accepts_common_addresses() {
        assert!(is_valid_email("bennafla.riidha@gmail.com"));
        assert!(is_valid_email("first+tag@sub.example.co.uk"));
        assert!(is_valid_email("o'brien@example.ie"));
        assert!(is_valid_email("user@localhost"));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@-example.com"));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email("user@example..com"));
    }

    #[test]
    fn test_rejects_oversized() {
        let local = "a".repeat(64);
        let domain = format!("{}.com", "b".repeat(60));
        let mut long = format!("{}@{}", local, domain);
        while long.len() <= MAX_EMAIL_LENGTH {
            long.insert_str(long.len() - 4, ".cc");
        }
        assert!(long.len() > MAX_EMAIL_LENGTH);
        assert!(matches!(validate_email(&long), Err(CopyError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_email_error_kind() {
        let err = validate_email("not-an-email").unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    proptest! {
        #[test]
        fn prop_strings_without_at_are_rejected(s in "[^@]{0,300}") {
            prop_assert!(validate_email(&s).is_err());
        }

        #[test]
        fn prop_oversized_strings_are_rejected(s in "[a-z]{250,300}@[a-z]{1,10}\\.com") {
            prop_assert!(!is_valid_email(&s));
        }

        #[test]
        fn prop_simple_addresses_are_accepted(
            local in "[a-z0-9._%+-]{1,40}",
            host in "[a-z0-9]{1,20}",
            tld in "[a-z]{2,6}",
        ) {
            let email = format!("{}@{}.{}", local, host, tld);
            prop_assert!(is_valid_email(&email));
        }
    }
}
