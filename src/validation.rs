//! Client-side field validation for the auth forms.
//!
//! Mirrors what the server enforces so obviously bad input never goes on the
//! wire. The server remains the authority; these checks only short-circuit.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ApiError, FieldError};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("Invalid email regex")
});

static OTP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("Invalid OTP regex"));

pub const MIN_NAME_LEN: usize = 2;

/// Validate a registration payload before it goes on the wire.
pub fn validate_sign_up(name: &str, email: &str) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    let name = name.trim();
    if name.is_empty() {
        errors.push(field_error("name", "Name is required"));
    } else if name.chars().count() < MIN_NAME_LEN {
        errors.push(field_error("name", "Name must be at least 2 characters"));
    }

    if let Err(e) = check_email(email) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Validate an email address shape.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    check_email(email).map_err(|e| ApiError::Validation(vec![e]))
}

/// Validate the 6-digit numeric one-time code shape.
pub fn validate_otp(otp: &str) -> Result<(), ApiError> {
    if OTP_RE.is_match(otp.trim()) {
        Ok(())
    } else {
        Err(ApiError::validation("otp", "OTP must be 6 digits"))
    }
}

fn check_email(email: &str) -> Result<(), FieldError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(field_error("email", "Email is required"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(field_error("email", "Invalid email address"));
    }
    Ok(())
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sign_up_passes() {
        assert!(validate_sign_up("Jonas Kahnewald", "jonas@example.com").is_ok());
    }

    #[test]
    fn test_short_name_rejected() {
        let err = validate_sign_up("J", "jonas@example.com").unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "name");
            }
            _ => panic!("expected validation error"),
        }
    }

    #[test]
    fn test_bad_email_and_name_collected_together() {
        let err = validate_sign_up("", "not-an-email").unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email"]);
            }
            _ => panic!("expected validation error"),
        }
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("jonas.kahnewald@gmail.com").is_ok());
        assert!(validate_email("UPPER@EXAMPLE.COM").is_ok());
        assert!(validate_email("a+b@sub.domain.co").is_ok());
        assert!(validate_email("missing-at.example.com").is_err());
        assert!(validate_email("jonas@nodot").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_otp_shapes() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp(" 123456 ").is_ok());
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("1234567").is_err());
        assert!(validate_otp("12a456").is_err());
        assert!(validate_otp("").is_err());
    }
}
