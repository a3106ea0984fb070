//! Named authentication operations over the transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{AuthResponse, OtpData, SignUpData, User};

/// Authentication operations of the remote API.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Register a new account; the server mails a one-time code.
    async fn sign_up(&self, data: &SignUpData) -> Result<(), ApiError>;
    /// Request a sign-in code for an existing account.
    async fn request_sign_in_code(&self, email: &str) -> Result<(), ApiError>;
    /// Exchange a one-time code for a session credential and identity.
    async fn verify_otp(&self, data: &OtpData) -> Result<AuthResponse, ApiError>;
    /// Re-issue the pending one-time code.
    async fn resend_otp(&self, email: &str) -> Result<(), ApiError>;
    /// Revoke the session server-side.
    async fn sign_out(&self) -> Result<(), ApiError>;
    /// Fetch the identity behind the stored credential.
    async fn current_user(&self) -> Result<User, ApiError>;
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: User,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

/// HTTP implementation of [`AuthApi`].
pub struct AuthService {
    api: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthApi for AuthService {
    async fn sign_up(&self, data: &SignUpData) -> Result<(), ApiError> {
        self.api.post_unit("/auth/signup", data).await
    }

    async fn request_sign_in_code(&self, email: &str) -> Result<(), ApiError> {
        self.api.post_unit("/auth/signin", &EmailBody { email }).await
    }

    async fn verify_otp(&self, data: &OtpData) -> Result<AuthResponse, ApiError> {
        self.api.post("/auth/verify-otp", data).await
    }

    async fn resend_otp(&self, email: &str) -> Result<(), ApiError> {
        self.api.post_unit("/auth/resend-otp", &EmailBody { email }).await
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        self.api.post_empty_unit("/auth/signout").await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let me: MeResponse = self.api.get("/auth/me", &[]).await?;
        Ok(me.user)
    }
}
