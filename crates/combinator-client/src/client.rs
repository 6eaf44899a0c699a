//! # API Client
//!
//! HTTP client for the Combinator platform API.

use std::sync::Arc;
use std::time::Duration;

use combinator_auth::{CredentialStore, RequestSigner};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::{ClientConfig, SigningPolicy};
use crate::error::{ApiError, ApiResult};
use crate::types::{
    CreateDomainRequest, CreateKvRequest, CreateRdbRequest, CreateWorkerRequest,
    CreatedResource, Domain, DomainList, EnvVars, KvList, LoginRequest, LoginResponse,
    MessageResponse, Rdb, RdbList, RegisterRequest, RegisterResponse, ResetPasswordRequest,
    SendCodeRequest, Worker, WorkerDetail, WorkerVarUpdate,
};

/// Message used when a failed response carries no `error` field.
pub const GENERIC_FAILURE: &str = "Request failed";

/// Authenticated client for the platform API.
///
/// Every request carries `Content-Type: application/json` and, once the
/// session holds a token, `Authorization: Bearer <token>`. Mutating calls
/// are additionally signed with the session's secret.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use combinator_auth::{CredentialStore, SigningScheme};
/// use combinator_client::{ClientConfig, ConsoleClient};
///
/// let store = Arc::new(CredentialStore::in_memory(SigningScheme::Hmac));
/// let client = ConsoleClient::new(&ClientConfig::default(), store)?;
///
/// if client.health().await? {
///     let rdbs = client.list_rdbs().await?;
///     println!("Found {} databases", rdbs.rdbs.len());
/// }
/// ```
#[derive(Clone)]
pub struct ConsoleClient {
    base_url: String,
    http: Client,
    store: Arc<CredentialStore>,
    signer: Arc<dyn RequestSigner>,
    policy: SigningPolicy,
}

impl ConsoleClient {
    /// Creates a client for `config`, signing with the store's scheme.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, store: Arc<CredentialStore>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        if store.scheme() != config.scheme {
            tracing::warn!(
                store = %store.scheme(),
                config = %config.scheme,
                "Credential store and client disagree on signing scheme, using the store's"
            );
        }

        Ok(Self {
            base_url: config.normalized_base_url().to_string(),
            http,
            signer: store.scheme().signer(),
            store,
            policy: config.policy,
        })
    }

    /// Replaces the request signer.
    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = signer;
        self
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential store backing this client.
    #[must_use]
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// The policy applied when signing material is missing.
    #[must_use]
    pub fn policy(&self) -> SigningPolicy {
        self.policy
    }

    // ==================== Core ====================

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.execute(Method::GET, path, None, false).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B, sensitive: bool) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body)?;
        self.execute(method, path, Some(body), sensitive).await
    }

    /// Sends one request.
    ///
    /// `body` is serialized once by the caller; the same string is signed
    /// and transmitted. Signing happens before any I/O, so a signing error
    /// means nothing was sent.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        sensitive: bool,
    ) -> ApiResult<T> {
        let session = self.store.session();

        let mut req = self
            .http
            .request(method.clone(), format!("{}{}", self.base_url, path))
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = session.token() {
            req = req.bearer_auth(token);
        }

        if sensitive {
            let payload = body.as_deref().unwrap_or_default();
            match self.signer.sign(payload, &session)? {
                Some(headers) => {
                    for (name, value) in headers.iter() {
                        req = req.header(name, value);
                    }
                }
                None => match self.policy {
                    SigningPolicy::FailOpen => {
                        tracing::warn!(%method, path, "No signing secret, sending request unsigned");
                    }
                    SigningPolicy::FailClosed => {
                        tracing::warn!(%method, path, "No signing secret, refusing request");
                        return Err(ApiError::MissingSigningMaterial);
                    }
                },
            }
        }

        if let Some(body) = body {
            req = req.body(body);
        }

        tracing::debug!(%method, path, sensitive, "Sending request");
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            let message = error_message(&text);
            tracing::debug!(%method, path, status = status.as_u16(), %message, "Request failed");
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let text = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    // ==================== Health ====================

    /// Checks if the API is reachable and healthy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the request fails.
    pub async fn health(&self) -> ApiResult<bool> {
        let res = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(res.status().is_success())
    }

    // ==================== Auth ====================

    /// Requests an email verification code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] if the server rejects the address.
    pub async fn send_code(&self, email: &str) -> ApiResult<MessageResponse> {
        let body = SendCodeRequest {
            email: email.to_string(),
        };
        self.send(Method::POST, "/api/auth/send-code", &body, false)
            .await
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] on an invalid code or duplicate email.
    pub async fn register(
        &self,
        email: &str,
        code: &str,
        password: &str,
    ) -> ApiResult<RegisterResponse> {
        let body = RegisterRequest {
            email: email.to_string(),
            code: code.to_string(),
            password: password.to_string(),
        };
        self.send(Method::POST, "/api/auth/register", &body, false)
            .await
    }

    /// Logs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] on invalid credentials.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(Method::POST, "/api/auth/login", &body, false)
            .await
    }

    /// Resets a password using an emailed verification code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] on an invalid or expired code.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> ApiResult<MessageResponse> {
        let body = ResetPasswordRequest {
            email: email.to_string(),
            code: code.to_string(),
            new_password: new_password.to_string(),
        };
        self.send(Method::POST, "/api/auth/reset-password", &body, false)
            .await
    }

    // ==================== RDB ====================

    /// Lists the user's databases.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn list_rdbs(&self) -> ApiResult<RdbList> {
        self.get("/api/rdb").await
    }

    /// Retrieves one database.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] if it does not exist.
    pub async fn get_rdb(&self, id: &str) -> ApiResult<Rdb> {
        self.get(&format!("/api/rdb/{id}")).await
    }

    /// Creates a database. Signed.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or the request fails.
    pub async fn create_rdb(&self, name: &str) -> ApiResult<CreatedResource> {
        let body = CreateRdbRequest {
            name: name.to_string(),
        };
        self.send(Method::POST, "/api/rdb", &body, true).await
    }

    /// Deletes a database. Signed over the body `{}`.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or the request fails.
    pub async fn delete_rdb(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/api/rdb/{id}")).await
    }

    // ==================== KV ====================

    /// Lists the user's KV stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn list_kvs(&self) -> ApiResult<KvList> {
        self.get("/api/kv").await
    }

    /// Creates a KV store. Signed.
    ///
    /// A successful response may still carry an `error` warning.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or the request fails.
    pub async fn create_kv(&self, kv_type: &str, url: &str) -> ApiResult<CreatedResource> {
        let body = CreateKvRequest {
            kv_type: kv_type.to_string(),
            url: url.to_string(),
        };
        self.send(Method::POST, "/api/kv", &body, true).await
    }

    /// Deletes a KV store. Signed over the body `{}`.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or the request fails.
    pub async fn delete_kv(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/api/kv/{id}")).await
    }

    // ==================== Workers ====================

    /// Lists the user's workers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn list_workers(&self) -> ApiResult<Vec<Worker>> {
        let workers: Option<Vec<Worker>> = self.get("/api/worker").await?;
        Ok(workers.unwrap_or_default())
    }

    /// Retrieves a worker and its deployed versions.
    ///
    /// `offset` pages through older versions; zero is the first page.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] if the worker does not exist.
    pub async fn get_worker(&self, id: &str, offset: Option<u64>) -> ApiResult<WorkerDetail> {
        let path = match offset {
            Some(n) if n > 0 => format!("/api/worker/{id}?offset={n}"),
            _ => format!("/api/worker/{id}"),
        };
        self.get(&path).await
    }

    /// Creates a worker. Signed.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or the request fails.
    pub async fn create_worker(&self, worker_name: &str) -> ApiResult<Worker> {
        let body = CreateWorkerRequest {
            worker_name: worker_name.to_string(),
        };
        self.send(Method::POST, "/api/worker", &body, true).await
    }

    /// Deletes a worker. Signed over the body `{}`.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or the request fails.
    pub async fn delete_worker(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/api/worker/{id}")).await
    }

    /// Reads a worker's environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn worker_env(&self, id: &str) -> ApiResult<EnvVars> {
        let env: Option<EnvVars> = self.get(&format!("/api/worker/{id}/env")).await?;
        Ok(env.unwrap_or_default())
    }

    /// Sets or removes one of a worker's environment variables. Signed.
    ///
    /// Returns the merged environment as stored by the server.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or the request fails.
    pub async fn set_worker_env(&self, id: &str, update: &WorkerVarUpdate) -> ApiResult<EnvVars> {
        let stored: Option<EnvVars> = self
            .send(Method::POST, &format!("/api/worker/{id}/env"), update, true)
            .await?;
        Ok(stored.unwrap_or_default())
    }

    /// Lists the names of a worker's secrets. Values are never returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn worker_secrets(&self, id: &str) -> ApiResult<Vec<String>> {
        let keys: Option<Vec<String>> = self.get(&format!("/api/worker/{id}/secret")).await?;
        Ok(keys.unwrap_or_default())
    }

    /// Sets or removes one of a worker's secrets. Signed.
    ///
    /// Returns the secret names now stored.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or the request fails.
    pub async fn set_worker_secret(
        &self,
        id: &str,
        update: &WorkerVarUpdate,
    ) -> ApiResult<Vec<String>> {
        let keys: Option<Vec<String>> = self
            .send(Method::POST, &format!("/api/worker/{id}/secret"), update, true)
            .await?;
        Ok(keys.unwrap_or_default())
    }

    // ==================== Domains ====================

    /// Lists the user's custom domains.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn list_domains(&self) -> ApiResult<DomainList> {
        self.get("/api/domain").await
    }

    /// Retrieves one custom domain with its verification record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Server`] if it does not exist.
    pub async fn get_domain(&self, id: &str) -> ApiResult<Domain> {
        self.get(&format!("/api/domain/{id}")).await
    }

    /// Adds a custom domain. Signed.
    ///
    /// The response carries the TXT record the user must publish.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or the request fails.
    pub async fn create_domain(&self, domain: &str, target: &str) -> ApiResult<Domain> {
        let body = CreateDomainRequest {
            domain: domain.to_string(),
            target: target.to_string(),
        };
        self.send(Method::POST, "/api/domain", &body, true).await
    }

    /// Deletes a custom domain. Signed over the body `{}`.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or the request fails.
    pub async fn delete_domain(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/api/domain/{id}")).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let _: Value = self
            .send(Method::DELETE, path, &Value::Object(serde_json::Map::new()), true)
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for ConsoleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleClient")
            .field("base_url", &self.base_url)
            .field("scheme", &self.signer.scheme())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Extracts the server's `error` string from a failure body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.as_str().map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}
