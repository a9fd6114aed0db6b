//! Credential domain
//!
//! This module provides the credential entity, the store trait the auth
//! service depends on, and the input rules applied at signup.

mod entity;
mod repository;
mod validation;

pub use entity::{Credential, CredentialId, NewCredential, PublicCredential};
pub use repository::CredentialRepository;
pub use validation::{
    validate_password, validate_username, CredentialValidationError, MAX_PASSWORD_LENGTH,
    MAX_USERNAME_LENGTH,
};

#[cfg(test)]
pub use repository::mock::MockCredentialRepository;
