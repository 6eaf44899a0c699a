//! HMAC-SHA-256 request signing with millisecond timestamps.

use ::hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use super::{
    RequestSigner, SignatureHeaders, SigningScheme, SIGNATURE_HEADER, TIMESTAMP_HEADER,
    USER_ID_HEADER,
};
use crate::encoding::{base64url_nopad, timestamped_input};
use crate::{AuthError, Clock, Result, Session, SystemClock};

type HmacSha256 = Hmac<Sha256>;

/// Computes the encoded HMAC signature for a body and timestamp.
///
/// The key is the UTF-8 encoding of `secret`; the input is
/// `body + timestamp`; the output is URL-safe base64 without padding.
///
/// # Errors
///
/// Returns [`AuthError::Signing`] if the MAC cannot be keyed.
pub fn hmac_signature(secret: &str, body: &str, timestamp: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AuthError::Signing(e.to_string()))?;
    mac.update(timestamped_input(body, timestamp).as_bytes());
    Ok(base64url_nopad(&mac.finalize().into_bytes()))
}

/// Signs requests with the session's symmetric `sk_...` secret.
///
/// Each call reads a fresh timestamp from the clock, so two signatures of
/// the same body taken at different instants differ.
#[derive(Clone)]
pub struct HmacSigner {
    clock: Arc<dyn Clock>,
}

impl HmacSigner {
    /// Creates a signer that stamps requests with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a signer with an explicit clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for HmacSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner").finish_non_exhaustive()
    }
}

impl RequestSigner for HmacSigner {
    fn scheme(&self) -> SigningScheme {
        SigningScheme::Hmac
    }

    fn sign(&self, body: &str, session: &Session) -> Result<Option<SignatureHeaders>> {
        let (Some(secret), Some(user_id)) = (session.secret(), session.user_id()) else {
            return Ok(None);
        };

        let timestamp = self.clock.now_millis().to_string();
        let signature = hmac_signature(secret.expose(), body, &timestamp)?;

        tracing::debug!(body_len = body.len(), %timestamp, "Signed request with HMAC");

        let mut headers = SignatureHeaders::default();
        headers.push(SIGNATURE_HEADER, signature);
        headers.push(USER_ID_HEADER, user_id);
        headers.push(TIMESTAMP_HEADER, timestamp);
        Ok(Some(headers))
    }
}
