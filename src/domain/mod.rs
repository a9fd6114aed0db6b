//! Domain layer - Core business logic and entities

pub mod credential;
pub mod error;

pub use credential::{
    validate_password, validate_username, Credential, CredentialId, CredentialRepository,
    CredentialValidationError, NewCredential, PublicCredential,
};
pub use error::{DomainError, TokenError};
