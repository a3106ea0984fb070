//! Auth session store.
//!
//! Owns the current identity, the loading flag, and the persisted credential,
//! and drives the sign-up / sign-in / verify / sign-out transitions. The
//! remote API stays authoritative over whether a code exchange or a stored
//! credential is valid; this store only reflects the outcome.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::api::AuthApi;
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::models::{OtpData, SignUpData, User};
use crate::validation;

/// Seconds a user should wait before asking for another code. Cosmetic:
/// presentation renders a countdown from it, the call itself is not blocked.
pub const RESEND_WINDOW_SECS: i64 = 60;

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    /// A one-time code has been requested for this address.
    CodePending { email: String },
    Authenticated,
}

struct SessionState {
    phase: SessionPhase,
    user: Option<User>,
    resend_ready_at: Option<DateTime<Utc>>,
}

/// The session state machine plus its collaborators, one instance per client.
pub struct SessionManager {
    auth: Arc<dyn AuthApi>,
    credentials: Arc<dyn CredentialStore>,
    state: RwLock<SessionState>,
    loading: AtomicBool,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthApi>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            auth,
            credentials,
            state: RwLock::new(SessionState {
                phase: SessionPhase::Unauthenticated,
                user: None,
                resend_ready_at: None,
            }),
            loading: AtomicBool::new(false),
        }
    }

    /// Resume a previous session at process start. Returns whether the
    /// session ended up authenticated. Any failure discards the credential.
    pub async fn restore(&self) -> bool {
        if self.credentials.load().is_none() {
            return false;
        }

        self.loading.store(true, Ordering::SeqCst);
        let result = self.auth.current_user().await;
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(user) => {
                log::info!("[SESSION] Restored session for {}", user.email);
                let mut state = self.state.write().await;
                state.phase = SessionPhase::Authenticated;
                state.user = Some(user);
                true
            }
            Err(e) => {
                log::warn!("[SESSION] Stored credential rejected: {}", e);
                if let Err(e) = self.credentials.clear() {
                    log::warn!("[SESSION] Failed to discard credential: {}", e);
                }
                let mut state = self.state.write().await;
                state.phase = SessionPhase::Unauthenticated;
                state.user = None;
                false
            }
        }
    }

    /// Register a new account. On success a code is on its way to the
    /// address and the session is waiting on it.
    pub async fn sign_up(&self, data: SignUpData) -> Result<(), ApiError> {
        validation::validate_sign_up(&data.name, &data.email)?;
        self.auth.sign_up(&data).await?;
        self.enter_code_pending(data.email).await;
        Ok(())
    }

    /// Ask for a sign-in code for an existing account.
    pub async fn request_sign_in_code(&self, email: &str) -> Result<(), ApiError> {
        validation::validate_email(email)?;
        self.auth.request_sign_in_code(email).await?;
        self.enter_code_pending(email.to_string()).await;
        Ok(())
    }

    /// Exchange the emailed code for a session. A failed exchange leaves the
    /// phase untouched so the user can retry or resend.
    pub async fn verify_code(&self, email: &str, otp: &str) -> Result<User, ApiError> {
        validation::validate_otp(otp)?;
        let data = OtpData {
            email: email.trim().to_string(),
            otp: otp.trim().to_string(),
        };

        let response = self.auth.verify_otp(&data).await?;
        if let Err(e) = self.credentials.save(&response.token) {
            return Err(ApiError::Unexpected(format!(
                "Failed to persist session credential: {}",
                e
            )));
        }

        let mut state = self.state.write().await;
        state.phase = SessionPhase::Authenticated;
        state.user = Some(response.user.clone());
        state.resend_ready_at = None;
        log::info!("[SESSION] Authenticated as {}", response.user.email);
        Ok(response.user)
    }

    /// Re-issue the pending code and re-arm the countdown window.
    pub async fn resend_code(&self, email: &str) -> Result<(), ApiError> {
        validation::validate_email(email)?;
        self.auth.resend_otp(email).await?;
        let mut state = self.state.write().await;
        state.resend_ready_at = Some(Utc::now() + Duration::seconds(RESEND_WINDOW_SECS));
        Ok(())
    }

    /// Seconds left before another resend is appropriate. `None` means ready.
    pub async fn resend_available_in(&self) -> Option<i64> {
        let state = self.state.read().await;
        state.resend_ready_at.and_then(|ready_at| {
            let left = (ready_at - Utc::now()).num_seconds();
            if left > 0 { Some(left) } else { None }
        })
    }

    /// Adopt an externally supplied credential (e.g. a deep-link token) and
    /// exchange it for an identity. A failed exchange discards the token.
    pub async fn adopt_token(&self, token: &str) -> Result<User, ApiError> {
        if let Err(e) = self.credentials.save(token) {
            return Err(ApiError::Unexpected(format!(
                "Failed to persist session credential: {}",
                e
            )));
        }

        match self.auth.current_user().await {
            Ok(user) => {
                log::info!("[SESSION] Adopted external credential for {}", user.email);
                let mut state = self.state.write().await;
                state.phase = SessionPhase::Authenticated;
                state.user = Some(user.clone());
                Ok(user)
            }
            Err(e) => {
                if let Err(clear_err) = self.credentials.clear() {
                    log::warn!("[SESSION] Failed to discard credential: {}", clear_err);
                }
                let mut state = self.state.write().await;
                state.phase = SessionPhase::Unauthenticated;
                state.user = None;
                Err(e)
            }
        }
    }

    /// Sign out. The remote revoke is best-effort: local state always
    /// clears, and a remote failure is swallowed after a warning.
    pub async fn sign_out(&self) {
        if let Err(e) = self.auth.sign_out().await {
            log::warn!(
                "[SESSION] Remote sign-out failed, clearing local state anyway: {}",
                e
            );
        }
        if let Err(e) = self.credentials.clear() {
            log::warn!("[SESSION] Failed to clear stored credential: {}", e);
        }
        let mut state = self.state.write().await;
        state.phase = SessionPhase::Unauthenticated;
        state.user = None;
        state.resend_ready_at = None;
        log::info!("[SESSION] Signed out");
    }

    async fn enter_code_pending(&self, email: String) {
        log::info!("[SESSION] One-time code requested for {}", email);
        let mut state = self.state.write().await;
        state.phase = SessionPhase::CodePending { email };
        state.resend_ready_at = Some(Utc::now() + Duration::seconds(RESEND_WINDOW_SECS));
    }

    // ── Accessors ───────────────────────────────────

    pub async fn phase(&self) -> SessionPhase {
        self.state.read().await.phase.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(self.state.read().await.phase, SessionPhase::Authenticated)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::models::AuthResponse;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    fn make_user(email: &str) -> User {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Jonas".to_string(),
            email: email.to_string(),
            date_of_birth: None,
            avatar: None,
            is_email_verified: true,
            auth_method: Default::default(),
            created_at: Utc::now(),
        }
    }

    /// Scripted in-memory stand-in for the remote auth API.
    #[derive(Default)]
    struct FakeAuthApi {
        verify: Mutex<Option<Result<AuthResponse, ApiError>>>,
        me: Mutex<Option<Result<User, ApiError>>>,
        sign_out_error: Mutex<Option<ApiError>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeAuthApi {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl AuthApi for FakeAuthApi {
        async fn sign_up(&self, _data: &SignUpData) -> Result<(), ApiError> {
            self.calls.lock().push("sign_up");
            Ok(())
        }

        async fn request_sign_in_code(&self, _email: &str) -> Result<(), ApiError> {
            self.calls.lock().push("request_sign_in_code");
            Ok(())
        }

        async fn verify_otp(&self, _data: &OtpData) -> Result<AuthResponse, ApiError> {
            self.calls.lock().push("verify_otp");
            self.verify
                .lock()
                .clone()
                .unwrap_or_else(|| Err(ApiError::Unexpected("no scripted verify result".into())))
        }

        async fn resend_otp(&self, _email: &str) -> Result<(), ApiError> {
            self.calls.lock().push("resend_otp");
            Ok(())
        }

        async fn sign_out(&self) -> Result<(), ApiError> {
            self.calls.lock().push("sign_out");
            match self.sign_out_error.lock().clone() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        async fn current_user(&self) -> Result<User, ApiError> {
            self.calls.lock().push("current_user");
            self.me
                .lock()
                .clone()
                .unwrap_or_else(|| Err(ApiError::Unexpected("no scripted identity".into())))
        }
    }

    fn setup() -> (Arc<FakeAuthApi>, Arc<MemoryCredentialStore>, SessionManager) {
        let fake = Arc::new(FakeAuthApi::default());
        let credentials = Arc::new(MemoryCredentialStore::new());
        let manager = SessionManager::new(fake.clone(), credentials.clone());
        (fake, credentials, manager)
    }

    fn jonas_sign_up() -> SignUpData {
        SignUpData {
            name: "Jonas".to_string(),
            email: "jonas@example.com".to_string(),
            date_of_birth: None,
        }
    }

    #[tokio::test]
    async fn test_sign_up_then_verify_authenticates() {
        let (fake, credentials, manager) = setup();
        *fake.verify.lock() = Some(Ok(AuthResponse {
            token: "tok-1".to_string(),
            user: make_user("jonas@example.com"),
        }));

        manager.sign_up(jonas_sign_up()).await.expect("sign_up failed");
        assert_eq!(
            manager.phase().await,
            SessionPhase::CodePending {
                email: "jonas@example.com".to_string()
            }
        );

        let user = manager
            .verify_code("jonas@example.com", "123456")
            .await
            .expect("verify failed");
        assert_eq!(user.email, "jonas@example.com");
        assert!(manager.is_authenticated().await);
        assert_eq!(
            manager.current_user().await.map(|u| u.email),
            Some("jonas@example.com".to_string())
        );
        assert_eq!(credentials.load().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_invalid_code_keeps_code_pending_and_no_credential() {
        let (fake, credentials, manager) = setup();
        *fake.verify.lock() = Some(Err(ApiError::Rejected {
            status: 400,
            message: "Invalid or expired OTP".to_string(),
        }));

        manager
            .request_sign_in_code("jonas@example.com")
            .await
            .expect("request code failed");

        let err = manager
            .verify_code("jonas@example.com", "654321")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid or expired OTP");

        // Still waiting on a code, nothing persisted; retry stays possible.
        assert_eq!(
            manager.phase().await,
            SessionPhase::CodePending {
                email: "jonas@example.com".to_string()
            }
        );
        assert!(credentials.load().is_none());
    }

    #[tokio::test]
    async fn test_malformed_code_rejected_before_any_network_call() {
        let (fake, _credentials, manager) = setup();
        let err = manager.verify_code("jonas@example.com", "12ab56").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_validation_short_circuits() {
        let (fake, _credentials, manager) = setup();
        let err = manager
            .sign_up(SignUpData {
                name: "J".to_string(),
                email: "jonas@example.com".to_string(),
                date_of_birth: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(fake.calls().is_empty());
        assert_eq!(manager.phase().await, SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_sign_out_clears_local_state_even_when_remote_fails() {
        let (fake, credentials, manager) = setup();
        *fake.me.lock() = Some(Ok(make_user("jonas@example.com")));
        manager.adopt_token("tok-9").await.expect("adopt failed");
        assert!(manager.is_authenticated().await);

        *fake.sign_out_error.lock() =
            Some(ApiError::Server("Internal server error".to_string()));
        manager.sign_out().await;

        assert_eq!(manager.phase().await, SessionPhase::Unauthenticated);
        assert!(manager.current_user().await.is_none());
        assert!(credentials.load().is_none());
    }

    #[tokio::test]
    async fn test_restore_resumes_session_from_stored_credential() {
        let (fake, credentials, manager) = setup();
        credentials.save("tok-stored").unwrap();
        *fake.me.lock() = Some(Ok(make_user("jonas@example.com")));

        assert!(manager.restore().await);
        assert!(manager.is_authenticated().await);
        assert_eq!(credentials.load().as_deref(), Some("tok-stored"));
    }

    #[tokio::test]
    async fn test_restore_discards_rejected_credential() {
        let (fake, credentials, manager) = setup();
        credentials.save("tok-stale").unwrap();
        *fake.me.lock() = Some(Err(ApiError::Unauthorized));

        assert!(!manager.restore().await);
        assert_eq!(manager.phase().await, SessionPhase::Unauthenticated);
        assert!(credentials.load().is_none());
    }

    #[tokio::test]
    async fn test_restore_without_credential_skips_the_network() {
        let (fake, _credentials, manager) = setup();
        assert!(!manager.restore().await);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_adopt_token_failure_discards_token() {
        let (fake, credentials, manager) = setup();
        *fake.me.lock() = Some(Err(ApiError::Network(
            "Network error. Please check your connection.".to_string(),
        )));

        let err = manager.adopt_token("tok-deep-link").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert!(credentials.load().is_none());
        assert_eq!(manager.phase().await, SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_code_request_arms_resend_window() {
        let (_fake, _credentials, manager) = setup();
        manager
            .request_sign_in_code("jonas@example.com")
            .await
            .expect("request code failed");
        let left = manager.resend_available_in().await;
        assert!(left.is_some());
        assert!(left.unwrap() <= RESEND_WINDOW_SECS);
    }
}
