//! Error taxonomy for remote API failures.
//!
//! Every failure the transport sees is normalized into one `ApiError` kind,
//! whether it came back as a validation error list, a not-found, a server
//! fault, or no response at all. Services propagate these unchanged; stores
//! record a display message and re-raise.

use serde::Deserialize;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Normalized failure kinds for every remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Field-level validation failures, client- or server-originated.
    #[error("{}", join_messages(.0))]
    Validation(Vec<FieldError>),

    /// The server rejected the credential. Handled globally: the transport
    /// clears the stored credential and emits `SessionRevoked` before this
    /// reaches the caller.
    #[error("Your session has expired. Please sign in again.")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// 5xx responses.
    #[error("{0}")]
    Server(String),

    /// No response reachable at all (connect failure, timeout).
    #[error("{0}")]
    Network(String),

    /// Any other non-success status, with the server's message when present.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Failures that never produced a well-formed HTTP exchange, e.g. an
    /// undecodable success body.
    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    /// Single-field validation failure.
    pub fn validation(field: &str, message: &str) -> Self {
        ApiError::Validation(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_joins_messages() {
        let err = ApiError::Validation(vec![
            FieldError {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            },
            FieldError {
                field: "email".to_string(),
                message: "Invalid email address".to_string(),
            },
        ]);
        assert_eq!(err.to_string(), "Name is required, Invalid email address");
    }

    #[test]
    fn test_single_field_helper() {
        let err = ApiError::validation("otp", "OTP must be 6 digits");
        match err {
            ApiError::Validation(ref errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "otp");
            }
            _ => panic!("expected validation error"),
        }
        assert_eq!(err.to_string(), "OTP must be 6 digits");
    }

    #[test]
    fn test_unauthorized_flag() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::NotFound("Resource not found".to_string()).is_unauthorized());
    }
}
