//! Request field validation
//!
//! Usernames are lowercase alphanumerics plus dots and underscores, the
//! same alphabet the directory indexes on.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ApiError;

/// Maximum length for usernames
pub const MAX_USERNAME_LEN: usize = 64;

/// Maximum length for email addresses
pub const MAX_EMAIL_LEN: usize = 254;

/// Password length bounds
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[a-z0-9._]+$").expect("valid username regex"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Validate a username
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "username must be between 1 and {MAX_USERNAME_LEN} characters"
        )));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(ApiError::BadRequest(
            "username can only contain lowercase alphanumerical chars, underscores and dots"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(email) {
        return Err(ApiError::BadRequest(
            "the email address is invalid".to_string(),
        ));
    }
    Ok(())
}

/// Validate a plaintext password before hashing
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an explicit role list (at least one role required)
pub fn validate_roles<T>(roles: &[T]) -> Result<(), ApiError> {
    if roles.is_empty() {
        return Err(ApiError::BadRequest(
            "at least one role must be present".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("mariorossi").is_ok());
        assert!(validate_username("mario.rossi_99").is_ok());
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(validate_username("").is_err());
        assert!(validate_username("Mario").is_err());
        assert!(validate_username("mario rossi").is_err());
        assert!(validate_username("mario@rossi").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("mario@example.com").is_ok());
        assert!(validate_email("mario.rossi+tag@sub.example.org").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("mario").is_err());
        assert!(validate_email("mario@").is_err());
        assert!(validate_email("mario@example").is_err());
        assert!(validate_email("mario rossi@example.com").is_err());
    }

    #[test]
    fn test_password_bounds() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password(&"a".repeat(MAX_PASSWORD_LEN + 1)).is_err());
    }

    #[test]
    fn test_roles_must_be_non_empty() {
        assert!(validate_roles::<&str>(&[]).is_err());
        assert!(validate_roles(&["user"]).is_ok());
    }
}
