// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Input validation for the account API.

use crate::config::PasswordRequirements;
use crate::error::AppError;
use regex::Regex;
use std::sync::LazyLock;

// Common validation constants
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 32;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").unwrap());

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, AppError>;

/// Normalize an email address: trim surrounding whitespace and lowercase.
/// Every email comparison in the workflows happens on normalized values.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an already-normalized email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(AppError::Validation("Email must not be empty".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(AppError::Validation(format!(
            "Email must be at most {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::Validation(
            "Incorrect email format. Please try again".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a username
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(AppError::Validation(format!(
            "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(AppError::Validation(
            "Username must contain only alphanumeric characters, dots, underscores and hyphens"
                .to_string(),
        ));
    }

    Ok(username)
}

/// Validate a password against the configured complexity requirements
pub fn validate_password<'a>(
    password: &'a str,
    requirements: &PasswordRequirements,
) -> ValidationResult<&'a str> {
    if password.len() < requirements.min_length || password.len() > requirements.max_length {
        return Err(AppError::Validation(format!(
            "Password must be between {} and {} characters",
            requirements.min_length, requirements.max_length
        )));
    }

    if requirements.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
        return Err(AppError::Validation(
            "Password must contain both upper and lower case letters".to_string(),
        ));
    }

    if requirements.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
        return Err(AppError::Validation(
            "Password must contain both upper and lower case letters".to_string(),
        ));
    }

    Ok(password)
}
