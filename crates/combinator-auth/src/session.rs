//! The active console session.

use crate::SecretString;

/// Identity and signing material for the logged-in account.
///
/// A session is a plain value. The [`CredentialStore`](crate::CredentialStore)
/// owns the live instance and hands out snapshots; it is the only place a
/// session changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<String>,
    token: Option<String>,
    secret: Option<SecretString>,
}

impl Session {
    /// Creates a session from its parts.
    ///
    /// Empty strings are treated as absent.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        token: impl Into<String>,
        secret: Option<SecretString>,
    ) -> Self {
        Self {
            user_id: non_empty(user_id.into()),
            token: non_empty(token.into()),
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Returns an unauthenticated session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The backend-issued user identifier, if logged in.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The bearer token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The signing secret, if one is cached.
    #[must_use]
    pub fn secret(&self) -> Option<&SecretString> {
        self.secret.as_ref()
    }

    /// Whether a bearer token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Whether the session can sign requests that need a user id.
    #[must_use]
    pub fn can_sign(&self) -> bool {
        self.secret.is_some() && self.user_id.is_some()
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
