//! # Credential Store
//!
//! Owns the live [`Session`] and its persisted copy.
//!
//! The persisted record is a JSON object stored under [`STORAGE_KEY`]:
//!
//! ```json
//! { "userId": "alice123456", "token": "<jwt>", "secretKey": "sk_..." }
//! ```
//!
//! Under the RSA scheme the secret field is named `privateKey`. The record
//! is written on every login or registration, read once at startup and
//! removed on logout.

mod backend;

pub use backend::{FileStore, KeyValueStore, MemoryStore};

use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{Result, SecretString, Session, SigningScheme};

/// Storage key of the persisted credential record.
pub const STORAGE_KEY: &str = "console_credentials";

/// The persisted form of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Backend user identifier.
    pub user_id: String,
    /// Bearer token.
    pub token: String,
    /// Signing secret, absent when the record carries none.
    pub secret: Option<SecretString>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    user_id: String,
    token: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl CredentialRecord {
    /// Serializes the record, naming the secret field after `scheme`.
    #[must_use]
    pub fn to_json(&self, scheme: SigningScheme) -> String {
        let mut map = Map::new();
        map.insert("userId".into(), Value::String(self.user_id.clone()));
        map.insert("token".into(), Value::String(self.token.clone()));
        if let Some(secret) = &self.secret {
            map.insert(
                scheme.secret_field().into(),
                Value::String(secret.expose().to_string()),
            );
        }
        Value::Object(map).to_string()
    }

    /// Parses a record written by [`CredentialRecord::to_json`].
    ///
    /// An empty or missing secret field yields `secret: None`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Serialization`](crate::AuthError::Serialization) if the text is not a JSON object
    /// with string `userId` and `token` fields.
    pub fn from_json(s: &str, scheme: SigningScheme) -> Result<Self> {
        let raw: RawRecord = serde_json::from_str(s)?;
        let secret = raw
            .rest
            .get(scheme.secret_field())
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(SecretString::new);

        Ok(Self {
            user_id: raw.user_id,
            token: raw.token,
            secret,
        })
    }
}

/// Single authority for reading, writing and clearing the session.
///
/// Storage failures never propagate out of the store: a failed write is
/// logged and the in-memory session is still updated, a failed or corrupt
/// read is reported as "no stored session".
pub struct CredentialStore {
    backend: Box<dyn KeyValueStore>,
    scheme: SigningScheme,
    session: RwLock<Session>,
}

impl CredentialStore {
    /// Creates a store over `backend` with an unauthenticated session.
    ///
    /// Call [`CredentialStore::load`] to restore a persisted session.
    pub fn new(backend: impl KeyValueStore + 'static, scheme: SigningScheme) -> Self {
        Self {
            backend: Box::new(backend),
            scheme,
            session: RwLock::new(Session::anonymous()),
        }
    }

    /// Creates a store backed by memory only.
    #[must_use]
    pub fn in_memory(scheme: SigningScheme) -> Self {
        Self::new(MemoryStore::new(), scheme)
    }

    /// The signing scheme whose secret this store holds.
    #[must_use]
    pub fn scheme(&self) -> SigningScheme {
        self.scheme
    }

    /// Returns a snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    /// Replaces the persisted record and the in-memory session.
    pub fn save(&self, user_id: &str, token: &str, secret: SecretString) {
        let record = CredentialRecord {
            user_id: user_id.to_string(),
            token: token.to_string(),
            secret: Some(secret.clone()),
        };

        let mut session = self.session.write();
        if let Err(e) = self.backend.set(STORAGE_KEY, &record.to_json(self.scheme)) {
            tracing::warn!(error = %e, "Failed to persist credentials, keeping them in memory");
        }
        *session = Session::new(user_id, token, Some(secret));

        tracing::info!(user_id = %user_id, "Saved credentials");
    }

    /// Restores the session from storage.
    ///
    /// Returns `true` if a record was found and applied. On a missing,
    /// unreadable or malformed record the session is left untouched and
    /// `false` is returned.
    pub fn load(&self) -> bool {
        let Some(record) = self.read_record() else {
            return false;
        };

        tracing::info!(user_id = %record.user_id, "Restored credentials");
        *self.session.write() = Session::new(record.user_id, record.token, record.secret);
        true
    }

    /// Removes the persisted record and resets the session.
    pub fn clear(&self) {
        let mut session = self.session.write();
        if let Err(e) = self.backend.remove(STORAGE_KEY) {
            tracing::warn!(error = %e, "Failed to remove persisted credentials");
        }
        *session = Session::anonymous();

        tracing::info!("Cleared credentials");
    }

    /// Returns the persisted secret if the stored record belongs to `user_id`.
    ///
    /// The comparison is exact: an empty or differently-cased id never
    /// matches.
    #[must_use]
    pub fn stored_secret(&self, user_id: &str) -> Option<SecretString> {
        self.read_record()
            .filter(|record| record.user_id == user_id)
            .and_then(|record| record.secret)
    }

    /// Resets the in-memory session without touching storage.
    pub fn reset(&self) {
        *self.session.write() = Session::anonymous();
    }

    fn read_record(&self) -> Option<CredentialRecord> {
        let contents = match self.backend.get(STORAGE_KEY) {
            Ok(Some(contents)) => contents,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted credentials");
                return None;
            }
        };

        match CredentialRecord::from_json(&contents, self.scheme) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed persisted credentials");
                None
            }
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("scheme", &self.scheme)
            .field("session", &*self.session.read())
            .finish_non_exhaustive()
    }
}
