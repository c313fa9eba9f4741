//! Session token and username helpers.

use anyhow::{Context, Result};
use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::time::SystemTime;

const MAX_USERNAME_CHARS: usize = 64;
const MIN_PASSWORD_CHARS: usize = 4;

/// Create a new session token for the auth cookie.
/// The raw value is only returned to set the cookie; stores keep a hash.
pub fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session token so raw values never reach a store.
#[must_use]
pub fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Trim surrounding whitespace; usernames are otherwise case and byte exact.
pub(super) fn normalize_username(username: &str) -> &str {
    username.trim()
}

/// Non-empty, at most 64 characters, no whitespace or control characters.
pub(super) fn valid_username(username_normalized: &str) -> bool {
    username_normalized.chars().count() <= MAX_USERNAME_CHARS
        && Regex::new(r"^[^\s\p{Cc}]+$").is_ok_and(|re| re.is_match(username_normalized))
}

pub(super) fn valid_password_length(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
}

pub(super) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    #[test]
    fn generate_session_token_round_trip() {
        let decoded_len = generate_session_token()
            .ok()
            .and_then(|token| URL_SAFE_NO_PAD.decode(token.as_bytes()).ok())
            .map(|bytes| bytes.len());
        assert_eq!(decoded_len, Some(32));
    }

    #[test]
    fn generate_session_token_is_random() -> Result<()> {
        assert_ne!(generate_session_token()?, generate_session_token()?);
        Ok(())
    }

    #[test]
    fn hash_session_token_stable() {
        let first = hash_session_token("token");
        let second = hash_session_token("token");
        let different = hash_session_token("other");
        assert_eq!(first, second);
        assert_ne!(first, different);
        assert_eq!(first.len(), 32);
    }

    #[test]
    fn normalize_username_trims() {
        assert_eq!(normalize_username("  sue \n"), "sue");
        assert_eq!(normalize_username("Sue"), "Sue");
    }

    #[test]
    fn valid_username_rules() {
        assert!(valid_username("sue"));
        assert!(valid_username("sue.o'neil-42"));
        assert!(valid_username(&"a".repeat(64)));
        assert!(!valid_username(""));
        assert!(!valid_username("sue smith"));
        assert!(!valid_username("sue\u{7}"));
        assert!(!valid_username(&"a".repeat(65)));
    }

    #[test]
    fn password_length_boundary() {
        assert!(!valid_password_length(""));
        assert!(!valid_password_length("123"));
        assert!(valid_password_length("1234"));
        // counted in characters, not bytes
        assert!(!valid_password_length("äöü"));
    }

    #[test]
    fn now_unix_seconds_is_recent() {
        assert!(now_unix_seconds() > 1_600_000_000);
    }
}
