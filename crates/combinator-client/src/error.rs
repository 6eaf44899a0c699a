//! # API Errors
//!
//! Error types for API operations.

use combinator_auth::AuthError;
use thiserror::Error;

/// Errors that can occur during API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    ///
    /// `message` is the server's `error` field, or `Request failed` when the
    /// body carries none.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the server.
        message: String,
    },

    /// Failed to deserialize a success response.
    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    /// Failed to serialize a request body.
    #[error("invalid request body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The request could not be signed. Nothing was sent.
    #[error("signing failed: {0}")]
    Signing(#[from] AuthError),

    /// A sensitive request was refused because the session has no signing
    /// material and the client runs fail-closed. Nothing was sent.
    #[error("no signing secret available for this session; login again with your secret key")]
    MissingSigningMaterial,
}

impl ApiError {
    /// The HTTP status, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the error happened before anything was transmitted.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::Serialization(_) | ApiError::Signing(_) | ApiError::MissingSigningMaterial
        )
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
