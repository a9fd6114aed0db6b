//! Credential input validation

use thiserror::Error;

/// Errors that can occur during credential validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CredentialValidationError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Username cannot start or end with whitespace")]
    UsernameSurroundingWhitespace,

    #[error("Username contains a control character")]
    UsernameControlCharacter,

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

pub const MAX_USERNAME_LENGTH: usize = 64;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a username
///
/// Rules:
/// - Cannot be empty
/// - Maximum 64 characters
/// - No leading or trailing whitespace
/// - No control characters
pub fn validate_username(username: &str) -> Result<(), CredentialValidationError> {
    if username.is_empty() {
        return Err(CredentialValidationError::EmptyUsername);
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(CredentialValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    if username.trim() != username {
        return Err(CredentialValidationError::UsernameSurroundingWhitespace);
    }

    if username.chars().any(char::is_control) {
        return Err(CredentialValidationError::UsernameControlCharacter);
    }

    Ok(())
}

/// Validate a password against the configured minimum length
///
/// The upper bound keeps hashing cost bounded regardless of input.
pub fn validate_password(password: &str, min_length: usize) -> Result<(), CredentialValidationError> {
    let length = password.chars().count();

    if length < min_length {
        return Err(CredentialValidationError::PasswordTooShort(min_length));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(CredentialValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}
