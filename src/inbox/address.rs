//! Email address parsing.

use crate::{InboxenError, Result};

/// Split an email address on its first `@` into local part and domain.
///
/// Anything after the first `@`, further `@`s included, is the domain. An
/// address without `@` is `MalformedAddress`.
///
/// # Examples
///
/// ```
/// use inboxen::inbox::parse_address;
///
/// assert_eq!(parse_address("qwerty@example.com").unwrap(), ("qwerty", "example.com"));
/// assert!(parse_address("qwerty").is_err());
/// ```
pub fn parse_address(email: &str) -> Result<(&str, &str)> {
    email
        .split_once('@')
        .ok_or_else(|| InboxenError::MalformedAddress(email.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_address() {
        assert_eq!(
            parse_address("support@example.com").unwrap(),
            ("support", "example.com")
        );
    }

    #[test]
    fn test_parse_splits_on_first_at() {
        assert_eq!(parse_address("a@b@c").unwrap(), ("a", "b@c"));
    }

    #[test]
    fn test_parse_empty_parts() {
        assert_eq!(parse_address("@example.com").unwrap(), ("", "example.com"));
        assert_eq!(parse_address("local@").unwrap(), ("local", ""));
    }

    #[test]
    fn test_parse_without_at() {
        let err = parse_address("example.com").unwrap_err();
        assert!(matches!(err, InboxenError::MalformedAddress(ref s) if s == "example.com"));
    }
}
