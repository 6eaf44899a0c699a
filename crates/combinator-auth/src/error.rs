//! Error types for credential and signing operations.

use thiserror::Error;

/// Errors that can occur while handling credentials or signing requests.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The signing key could not be imported.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// The signature could not be computed.
    #[error("cannot sign request: {0}")]
    Signing(String),

    /// Encoding or decoding of key material failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The configured signing scheme name is not recognized.
    #[error("unknown signing scheme: {0}")]
    UnknownScheme(String),

    /// The credential store backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A persisted record could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    /// Returns whether this error means a request must not be sent.
    ///
    /// Storage failures only affect persistence; everything else happens
    /// while producing a signature.
    #[must_use]
    pub fn is_signing_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidKey(_) | AuthError::Signing(_) | AuthError::Encoding(_)
        )
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        AuthError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for AuthError {
    fn from(err: base64::DecodeError) -> Self {
        AuthError::Encoding(err.to_string())
    }
}

/// A specialized Result type for credential and signing operations.
pub type Result<T> = std::result::Result<T, AuthError>;
