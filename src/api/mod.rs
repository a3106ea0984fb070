//! Typed HTTP transport for the Notelark API.
//!
//! Every remote call funnels through [`ApiClient`]: the bearer credential is
//! attached when present, failures are normalized into [`ApiError`], and an
//! unauthorized response clears the stored credential and emits
//! [`AuthEvent::SessionRevoked`]. The transport never navigates anywhere;
//! what happens after a revocation is the top-level subscriber's call.

pub mod auth;
pub mod notes;

pub use auth::{AuthApi, AuthService};
pub use notes::{NotesApi, NotesService};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::error::{ApiError, FieldError};
use crate::events::{AuthEvent, AuthEventBus};

// ── Response envelopes ──────────────────────────────

/// Failure body shape shared by all endpoints.
#[derive(Debug, Deserialize)]
struct FailureBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Vec<FieldError>>,
}

/// Success envelope for endpoints that nest their payload under `data`.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

// ── Client ──────────────────────────────────────────

/// HTTP transport shared by the auth and notes services.
pub struct ApiClient {
    base_url: String,
    client: Client,
    credentials: Arc<dyn CredentialStore>,
    events: Arc<AuthEventBus>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialStore>,
        events: Arc<AuthEventBus>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: crate::http::shared_client().clone(),
            credentials,
            events,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut req = self.client.get(self.url(path));
        if !query.is_empty() {
            req = req.query(query);
        }
        self.execute(req).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(self.client.post(self.url(path)).json(body)).await
    }

    /// POST whose success body is only an acknowledgement message.
    pub(crate) async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.send(self.client.post(self.url(path)).json(body))
            .await
            .map(|_| ())
    }

    /// Body-less POST whose success body is only an acknowledgement message.
    pub(crate) async fn post_empty_unit(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.client.post(self.url(path))).await.map(|_| ())
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(self.client.put(self.url(path)).json(body)).await
    }

    /// Body-less PATCH (dedicated mutations like the pin toggle).
    pub(crate) async fn patch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.client.patch(self.url(path))).await
    }

    /// DELETE whose success body is ignored.
    pub(crate) async fn delete_unit(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(), ApiError> {
        let mut req = self.client.delete(self.url(path));
        if !query.is_empty() {
            req = req.query(query);
        }
        self.send(req).await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(req).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Unexpected(format!("Failed to decode response: {}", e)))
    }

    /// Attach the credential, send, and turn any non-success outcome into an
    /// [`ApiError`]. Returns the raw success response for the caller to read.
    async fn send(&self, mut req: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        if let Some(token) = self.credentials.load() {
            req = req.bearer_auth(token);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                ApiError::Network("Network error. Please check your connection.".to_string())
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            self.revoke_session();
        }
        Err(translate_failure(status, &body))
    }

    /// The credential is dead. Clear it and tell the top-level listener.
    fn revoke_session(&self) {
        if let Err(e) = self.credentials.clear() {
            log::warn!("[API] Failed to clear stored credential: {}", e);
        }
        self.events.emit(AuthEvent::SessionRevoked);
        log::info!("[API] Session revoked by server (401), credential cleared");
    }
}

// ── Failure translation ─────────────────────────────

/// Map a non-success response to the error taxonomy.
fn translate_failure(status: StatusCode, body: &str) -> ApiError {
    let parsed: Option<FailureBody> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|b| b.message.clone());

    if status == StatusCode::UNAUTHORIZED {
        return ApiError::Unauthorized;
    }
    if let Some(errors) = parsed.and_then(|b| b.errors).filter(|e| !e.is_empty()) {
        return ApiError::Validation(errors);
    }
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound(message.unwrap_or_else(|| "Resource not found".to_string()));
    }
    if status.is_server_error() {
        return ApiError::Server(message.unwrap_or_else(|| "Internal server error".to_string()));
    }
    ApiError::Rejected {
        status: status.as_u16(),
        message: message
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16())),
    }
}
