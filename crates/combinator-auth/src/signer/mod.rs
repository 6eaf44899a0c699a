//! # Request Signing
//!
//! Produces the headers that prove possession of the account's signing
//! secret for a single request body.
//!
//! Two schemes exist and a deployment uses exactly one of them:
//!
//! - [`HmacSigner`] - HMAC-SHA-256 over `body + timestamp`, URL-safe base64.
//!   Sends signature, user id and timestamp headers.
//! - [`RsaSigner`] - RSA PKCS#1 v1.5 / SHA-256 over the body, standard
//!   base64. Sends the signature header only.

mod hmac;
mod rsa;

pub use self::hmac::{hmac_signature, HmacSigner};
pub use self::rsa::RsaSigner;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{AuthError, Clock, Result, Session, SystemClock};

/// Header carrying the encoded signature.
pub const SIGNATURE_HEADER: &str = "X-Combinator-Signature";

/// Header carrying the raw user id (HMAC scheme).
pub const USER_ID_HEADER: &str = "X-Combinator-User-ID";

/// Header carrying the decimal millisecond timestamp (HMAC scheme).
pub const TIMESTAMP_HEADER: &str = "X-Combinator-Timestamp";

/// Signs request bodies on behalf of a session.
pub trait RequestSigner: Send + Sync {
    /// The scheme this signer implements.
    fn scheme(&self) -> SigningScheme;

    /// Signs `body`, the exact string that will be transmitted.
    ///
    /// Returns `Ok(None)` when the session lacks the material this scheme
    /// needs; the caller decides whether to proceed unsigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be imported or the signature
    /// cannot be computed. The request must then not be sent.
    fn sign(&self, body: &str, session: &Session) -> Result<Option<SignatureHeaders>>;
}

/// The set of authentication headers produced for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureHeaders {
    headers: Vec<(&'static str, String)>,
}

impl SignatureHeaders {
    pub(crate) fn push(&mut self, name: &'static str, value: impl Into<String>) {
        self.headers.push((name, value.into()));
    }

    /// Looks up a header value by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.headers.iter().map(|(n, v)| (*n, v.as_str()))
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether no headers were produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// The request-authentication scheme a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningScheme {
    /// Symmetric HMAC-SHA-256 with timestamps.
    #[default]
    Hmac,
    /// Legacy RSA PKCS#1 v1.5 signatures.
    Rsa,
}

impl SigningScheme {
    /// Field name of the secret in the persisted credential record.
    #[must_use]
    pub fn secret_field(self) -> &'static str {
        match self {
            SigningScheme::Hmac => "secretKey",
            SigningScheme::Rsa => "privateKey",
        }
    }

    /// Builds the signer for this scheme using the system clock.
    #[must_use]
    pub fn signer(self) -> Arc<dyn RequestSigner> {
        self.signer_with_clock(Arc::new(SystemClock))
    }

    /// Builds the signer for this scheme with an explicit clock.
    ///
    /// The clock only matters for [`SigningScheme::Hmac`].
    #[must_use]
    pub fn signer_with_clock(self, clock: Arc<dyn Clock>) -> Arc<dyn RequestSigner> {
        match self {
            SigningScheme::Hmac => Arc::new(HmacSigner::with_clock(clock)),
            SigningScheme::Rsa => Arc::new(RsaSigner::new()),
        }
    }
}

impl fmt::Display for SigningScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningScheme::Hmac => f.write_str("hmac"),
            SigningScheme::Rsa => f.write_str("rsa"),
        }
    }
}

impl FromStr for SigningScheme {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hmac" | "hmac-sha256" => Ok(SigningScheme::Hmac),
            "rsa" | "rsa-sha256" => Ok(SigningScheme::Rsa),
            other => Err(AuthError::UnknownScheme(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedClock;
    use pretty_assertions::assert_eq;

    #[test]
    fn scheme_parsing() {
        assert_eq!("hmac".parse::<SigningScheme>().unwrap(), SigningScheme::Hmac);
        assert_eq!("RSA".parse::<SigningScheme>().unwrap(), SigningScheme::Rsa);
        assert_eq!(
            "rsa-sha256".parse::<SigningScheme>().unwrap(),
            SigningScheme::Rsa
        );
        assert!("ed25519".parse::<SigningScheme>().is_err());
    }

    #[test]
    fn scheme_display_round_trips() {
        for scheme in [SigningScheme::Hmac, SigningScheme::Rsa] {
            assert_eq!(scheme.to_string().parse::<SigningScheme>().unwrap(), scheme);
        }
    }

    #[test]
    fn scheme_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&SigningScheme::Rsa).unwrap(), "\"rsa\"");
        let scheme: SigningScheme = serde_json::from_str("\"hmac\"").unwrap();
        assert_eq!(scheme, SigningScheme::Hmac);
    }

    #[test]
    fn secret_field_names() {
        assert_eq!(SigningScheme::Hmac.secret_field(), "secretKey");
        assert_eq!(SigningScheme::Rsa.secret_field(), "privateKey");
    }

    #[test]
    fn factory_returns_matching_signer() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(1));
        for scheme in [SigningScheme::Hmac, SigningScheme::Rsa] {
            assert_eq!(scheme.signer_with_clock(clock.clone()).scheme(), scheme);
        }
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = SignatureHeaders::default();
        headers.push(SIGNATURE_HEADER, "abc");
        assert_eq!(headers.get("x-combinator-signature"), Some("abc"));
        assert_eq!(headers.get(USER_ID_HEADER), None);
        assert_eq!(headers.len(), 1);
        assert!(!headers.is_empty());
    }
}
