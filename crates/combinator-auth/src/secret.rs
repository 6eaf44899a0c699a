//! Redacted holder for signing secrets.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// A secret string that is never printed and is wiped on drop.
///
/// Used for both the symmetric `sk_...` key and PEM-encoded private keys.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    /// Creates a new secret string.
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Exposes the secret value.
    ///
    /// Use this sparingly and only when necessary.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Returns the length of the secret in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.inner.as_bytes())
    }
}

impl Eq for SecretString {}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Constant-time byte comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_redaction() {
        let secret = SecretString::new("sk_live_abcdef");

        let debug_str = format!("{secret:?}");
        assert!(!debug_str.contains("sk_live_abcdef"));
        assert!(debug_str.contains("REDACTED"));

        let display_str = format!("{secret}");
        assert!(!display_str.contains("sk_live_abcdef"));
    }

    #[test]
    fn test_secret_string_expose() {
        let secret = SecretString::new("sk_test123");
        assert_eq!(secret.expose(), "sk_test123");
        assert_eq!(secret.len(), 10);
        assert!(!secret.is_empty());
        assert!(SecretString::new("").is_empty());
    }

    #[test]
    fn test_secret_string_equality() {
        assert_eq!(SecretString::new("a"), SecretString::from("a"));
        assert_ne!(SecretString::new("a"), SecretString::new("b"));
        assert_ne!(SecretString::new("a"), SecretString::new("aa"));
    }

    #[test]
    fn test_secret_string_serializes_as_plain_string() {
        let secret = SecretString::new("sk_x");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"sk_x\"");

        let back: SecretString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, secret);
    }
}
