//! # Combinator Auth
//!
//! Session credentials and request signing for the Combinator console.
//!
//! - [`CredentialStore`] owns the active [`Session`] (user id, bearer token,
//!   signing secret) and persists it to a [`KeyValueStore`].
//! - [`RequestSigner`] turns a request body and a session into the
//!   `X-Combinator-*` authentication headers. [`HmacSigner`] is the current
//!   scheme, [`RsaSigner`] the legacy one.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use combinator_auth::{CredentialStore, FixedClock, SigningScheme, SIGNATURE_HEADER};
//!
//! let store = CredentialStore::in_memory(SigningScheme::Hmac);
//! store.save("alice123456", "jwt", "sk_test123".into());
//!
//! let signer = SigningScheme::Hmac.signer_with_clock(Arc::new(FixedClock(1_700_000_000_000)));
//! let headers = signer
//!     .sign(r#"{"name":"mydb"}"#, &store.session())
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(
//!     headers.get(SIGNATURE_HEADER),
//!     Some("fsVlvfl3phYVQWKgFAYsYsGQIDrb1TY_60MnVHeD9UE")
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
pub mod encoding;
mod error;
mod secret;
mod session;
mod signer;
mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AuthError, Result};
pub use secret::SecretString;
pub use session::Session;
pub use signer::{
    hmac_signature, HmacSigner, RequestSigner, RsaSigner, SignatureHeaders, SigningScheme,
    SIGNATURE_HEADER, TIMESTAMP_HEADER, USER_ID_HEADER,
};
pub use store::{
    CredentialRecord, CredentialStore, FileStore, KeyValueStore, MemoryStore, STORAGE_KEY,
};
