//! Authentication infrastructure module
//!
//! This module provides Argon2 password hashing, JWT issuance and
//! verification, and the auth service that ties them to the credential store.

mod jwt;
mod password;
mod service;

pub use jwt::{IssuedToken, JwtClaims, JwtConfig, JwtService, TokenService, MIN_SECRET_LENGTH};
pub use password::{Argon2Hasher, PasswordHasher};
pub use service::{AuthService, AuthSettings};

#[cfg(test)]
pub(crate) use password::fast_hasher;
