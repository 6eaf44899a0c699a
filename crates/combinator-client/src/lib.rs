//! # Combinator Client
//!
//! Typed, authenticated HTTP client for the Combinator platform API.
//!
//! [`ConsoleClient`] shares a [`CredentialStore`](combinator_auth::CredentialStore)
//! with the rest of the application. Every call reads the current session,
//! attaches the bearer token and, for mutating calls, the request signature.
//! [`ClientConfig`] holds the persisted connection settings.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod types;

pub use client::{ConsoleClient, GENERIC_FAILURE};
pub use config::{ClientConfig, SigningPolicy, DEFAULT_BASE_URL};
pub use error::{ApiError, ApiResult};
pub use types::{
    CreateDomainRequest, CreateKvRequest, CreateRdbRequest, CreateWorkerRequest,
    CreatedResource, Domain, DomainList, EnvVars, Kv, KvList, LoginRequest, LoginResponse,
    MessageResponse, Rdb, RdbList, RegisterRequest, RegisterResponse, ResetPasswordRequest,
    SendCodeRequest, Worker, WorkerDetail, WorkerVarUpdate, WorkerVersion,
};
