//! # API Types
//!
//! Request and response bodies for the platform API.
//!
//! Response types are lenient: fields the server may omit fall back to
//! defaults so a partially populated record still renders.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==================== Auth ====================

/// Request for an email verification code.
#[derive(Debug, Clone, Serialize)]
pub struct SendCodeRequest {
    /// Address to send the code to.
    pub email: String,
}

/// Request to create an account.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Account email.
    pub email: String,
    /// Verification code received by email.
    pub code: String,
    /// Account password.
    pub password: String,
}

/// Response after registration.
///
/// `secret_key` is shown to the user exactly once.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    /// Backend user identifier.
    pub user_id: String,
    /// Registered email.
    #[serde(default)]
    pub email: String,
    /// Bearer token.
    pub token: String,
    /// Signing secret for the new account.
    #[serde(default)]
    pub secret_key: String,
}

/// Request to log in.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Response after login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Backend user identifier.
    pub user_id: String,
    /// Bearer token.
    pub token: String,
}

/// Request to reset a forgotten password.
#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordRequest {
    /// Account email.
    pub email: String,
    /// Verification code received by email.
    pub code: String,
    /// Replacement password.
    pub new_password: String,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    /// Human-readable status.
    #[serde(default)]
    pub message: String,
}

// ==================== RDB / KV ====================

/// A relational database resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rdb {
    /// Resource id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Connection URL.
    #[serde(default)]
    pub url: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
}

/// Response of the RDB list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RdbList {
    /// The user's databases.
    #[serde(default)]
    pub rdbs: Vec<Rdb>,
    /// Total size of the backing database in bytes, when reported.
    #[serde(default)]
    pub database_size: Option<u64>,
}

/// Request to create an RDB.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRdbRequest {
    /// Display name.
    pub name: String,
}

/// Response after creating an RDB or KV resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedResource {
    /// New resource id.
    #[serde(default)]
    pub id: String,
    /// Status message.
    #[serde(default)]
    pub message: Option<String>,
    /// Non-fatal warning reported alongside a successful creation.
    #[serde(default)]
    pub error: Option<String>,
}

/// A key-value store resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Kv {
    /// Resource id.
    pub id: String,
    /// Backend type, e.g. `redis`.
    #[serde(default)]
    pub kv_type: String,
    /// Connection URL.
    #[serde(default)]
    pub url: String,
}

/// Response of the KV list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KvList {
    /// The user's KV stores.
    #[serde(default)]
    pub kvs: Vec<Kv>,
}

/// Request to create a KV store.
#[derive(Debug, Clone, Serialize)]
pub struct CreateKvRequest {
    /// Backend type, e.g. `redis` or `memory`.
    pub kv_type: String,
    /// Connection URL.
    pub url: String,
}

// ==================== Workers ====================

/// A serverless worker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Worker {
    /// Worker id.
    pub worker_id: String,
    /// Display name.
    #[serde(default)]
    pub worker_name: String,
    /// Deployment status (`active`, `error`, ...).
    #[serde(default)]
    pub status: String,
    /// Currently serving version.
    #[serde(default)]
    pub active_version_id: Option<i64>,
}

/// One deployed version of a worker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkerVersion {
    /// Version id.
    pub id: i64,
    /// Container image.
    #[serde(default)]
    pub image: String,
    /// Exposed port.
    #[serde(default)]
    pub port: u16,
    /// Deployment status (`success`, `error`, ...).
    #[serde(default)]
    pub status: String,
    /// Deployment message.
    #[serde(default)]
    pub msg: String,
    /// Creation time as reported by the server.
    #[serde(default)]
    pub created_at: String,
}

/// Response of the worker detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerDetail {
    /// The worker.
    pub worker: Worker,
    /// Deployed versions, newest first.
    #[serde(default)]
    pub versions: Vec<WorkerVersion>,
}

/// Request to create a worker.
#[derive(Debug, Clone, Serialize)]
pub struct CreateWorkerRequest {
    /// Display name.
    pub worker_name: String,
}

/// Worker environment variables, ordered by key.
pub type EnvVars = BTreeMap<String, String>;

/// One change to a worker's env vars or secrets.
///
/// The server merges each change into what it already stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerVarUpdate {
    /// Variable name.
    pub key: String,
    /// New value; empty when deleting.
    pub value: String,
    /// Removes `key` instead of setting it.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub delete: bool,
}

impl WorkerVarUpdate {
    /// Sets `key` to `value`.
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            delete: false,
        }
    }

    /// Removes `key`.
    pub fn remove(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: String::new(),
            delete: true,
        }
    }
}

// ==================== Domains ====================

/// A custom domain routed to a target.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Domain {
    /// Domain id.
    pub id: String,
    /// The user's domain.
    #[serde(default)]
    pub domain: String,
    /// Proxy target.
    #[serde(default)]
    pub target: String,
    /// Verification status.
    #[serde(default)]
    pub status: String,
    /// Name of the verification TXT record.
    #[serde(default)]
    pub txt_name: String,
    /// Value of the verification TXT record.
    #[serde(default)]
    pub txt_value: String,
}

/// Response of the domain list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainList {
    /// The user's domains.
    #[serde(default)]
    pub domains: Vec<Domain>,
}

/// Request to add a custom domain.
#[derive(Debug, Clone, Serialize)]
pub struct CreateDomainRequest {
    /// The user's domain.
    pub domain: String,
    /// Proxy target.
    pub target: String,
}
