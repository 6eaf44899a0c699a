//! Legacy RSA PKCS#1 v1.5 / SHA-256 request signing.

use ring::rand::SystemRandom;
use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};

use super::{RequestSigner, SignatureHeaders, SigningScheme, SIGNATURE_HEADER};
use crate::encoding::{base64_standard, pem_to_der};
use crate::{AuthError, Result, Session};

/// Signs request bodies with the session's PEM-encoded RSA private key.
///
/// The key is imported on every call since the session's key can change
/// between requests. Identity travels only in the bearer token, so a user
/// id is not required.
#[derive(Debug, Clone)]
pub struct RsaSigner {
    rng: SystemRandom,
}

impl RsaSigner {
    /// Creates a new RSA signer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    /// Imports a PKCS#8 or PKCS#1 private key from PEM text.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidKey`] if the DER is neither encoding, or
    /// an encoding error if the PEM body is not base64.
    pub fn import_key(pem: &str) -> Result<RsaKeyPair> {
        let der = pem_to_der(pem)?;
        RsaKeyPair::from_pkcs8(&der)
            .or_else(|_| RsaKeyPair::from_der(&der))
            .map_err(|e| AuthError::InvalidKey(e.to_string()))
    }

    /// Returns the DER `RSAPublicKey` matching a PEM private key.
    ///
    /// # Errors
    ///
    /// Same as [`RsaSigner::import_key`].
    pub fn public_key_der(pem: &str) -> Result<Vec<u8>> {
        let key_pair = Self::import_key(pem)?;
        Ok(key_pair.public().as_ref().to_vec())
    }

    /// Signs `body` and returns the standard-base64 signature.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be imported or signing fails.
    pub fn signature(&self, pem: &str, body: &str) -> Result<String> {
        let key_pair = Self::import_key(pem)?;
        let mut signature = vec![0u8; key_pair.public().modulus_len()];
        key_pair
            .sign(&RSA_PKCS1_SHA256, &self.rng, body.as_bytes(), &mut signature)
            .map_err(|_| AuthError::Signing("RSA signature computation failed".into()))?;
        Ok(base64_standard(&signature))
    }
}

impl Default for RsaSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner for RsaSigner {
    fn scheme(&self) -> SigningScheme {
        SigningScheme::Rsa
    }

    fn sign(&self, body: &str, session: &Session) -> Result<Option<SignatureHeaders>> {
        let Some(secret) = session.secret() else {
            return Ok(None);
        };

        let signature = self.signature(secret.expose(), body)?;
        tracing::debug!(body_len = body.len(), "Signed request with RSA");

        let mut headers = SignatureHeaders::default();
        headers.push(SIGNATURE_HEADER, signature);
        Ok(Some(headers))
    }
}
