use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an account proves its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Email,
    Google,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Email => "email",
            AuthMethod::Google => "google",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "email" => Some(AuthMethod::Email),
            "google" => Some(AuthMethod::Google),
            _ => None,
        }
    }
}

impl Default for AuthMethod {
    fn default() -> Self {
        AuthMethod::Email
    }
}

/// Account identity as returned by the remote API. Immutable on the client;
/// refreshed only from server responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub auth_method: AuthMethod,
    pub created_at: DateTime<Utc>,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpData {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

/// One-time-code exchange payload.
#[derive(Debug, Clone, Serialize)]
pub struct OtpData {
    pub email: String,
    pub otp: String,
}

/// Successful code exchange: session credential plus identity.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_camel_case_wire_format() {
        let raw = r#"{
            "id": "u-1",
            "name": "Jonas Kahnewald",
            "email": "jonas@example.com",
            "dateOfBirth": "1999-06-21",
            "isEmailVerified": true,
            "authMethod": "email",
            "createdAt": "2025-01-01T00:00:00Z"
        }"#;
        let user: User = serde_json::from_str(raw).expect("Failed to parse user");
        assert_eq!(user.id, "u-1");
        assert_eq!(user.date_of_birth.as_deref(), Some("1999-06-21"));
        assert!(user.is_email_verified);
        assert_eq!(user.auth_method, AuthMethod::Email);
        assert!(user.avatar.is_none());
    }

    #[test]
    fn test_sign_up_omits_absent_date_of_birth() {
        let data = SignUpData {
            name: "Jonas".to_string(),
            email: "jonas@example.com".to_string(),
            date_of_birth: None,
        };
        let json = serde_json::to_string(&data).expect("Failed to serialize");
        assert!(!json.contains("dateOfBirth"));
    }

    #[test]
    fn test_auth_method_round_trip() {
        assert_eq!(AuthMethod::from_str("google"), Some(AuthMethod::Google));
        assert_eq!(AuthMethod::Google.as_str(), "google");
        assert_eq!(AuthMethod::from_str("ldap"), None);
    }
}
