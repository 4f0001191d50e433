//! Identifier rules shared by the manager, the config builder and the `Id` validator.

use lazy_static::lazy_static;
use rand::distr::Alphanumeric;
use rand::Rng;
use regex::Regex;

/// Length of freshly generated session ids.
pub const GENERATED_ID_LEN: usize = 32;

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9]+$").expect("valid session name pattern");
    static ref ID_RE: Regex = Regex::new(r"^[A-Za-z0-9,-]+$").expect("valid session id pattern");
}

/// Session names double as cookie names and must be plain alphanumerics.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

pub fn is_valid_id(id: &str) -> bool {
    ID_RE.is_match(id)
}

pub fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_alphanumeric_only() {
        assert!(is_valid_name("SESSIONID"));
        assert!(is_valid_name("abc123"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("foo-bar"));
        assert!(!is_valid_name("foo bar"));
    }

    #[test]
    fn ids_allow_comma_and_dash() {
        assert!(is_valid_id("abc,def-123"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("abc def"));
        assert!(!is_valid_id("abc;def"));
    }

    #[test]
    fn generated_ids_are_well_formed_and_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), GENERATED_ID_LEN);
        assert!(is_valid_id(&a));
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
