//! Password hashing utilities using Argon2

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password with a fresh random salt
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a hash; mismatches and unparsable hashes yield false
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id password hasher
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Create a hasher with the argon2 crate's default cost
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher with explicit cost parameters
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, DomainError> {
        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(|e| {
            DomainError::configuration(format!("Invalid Argon2 parameters: {}", e))
        })?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        if password.is_empty() {
            return Err(DomainError::invalid_input("Password cannot be empty"));
        }

        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        // Cost parameters are read from the hash itself
        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::with_params(1024, 1, 1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let password = "Sup3rSecret!";

        let hash = hasher.hash(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_hash_is_unique() {
        let hasher = fast_hasher();
        let password = "Sup3rSecret!";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // Hashes should be different due to random salt
        assert_ne!(hash1, hash2);

        // But both should verify correctly
        assert!(hasher.verify(password, &hash1));
        assert!(hasher.verify(password, &hash2));
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hasher = fast_hasher();
        let hash = hasher.hash("plaintext-marker").unwrap();
        assert!(!hash.contains("plaintext-marker"));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = fast_hasher();

        assert!(!hasher.verify("password", "invalid_hash_format"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_empty_password_rejected() {
        let hasher = fast_hasher();

        let result = hasher.hash("");
        assert!(matches!(result, Err(DomainError::InvalidInput { .. })));
    }

    #[test]
    fn test_verify_uses_params_from_hash() {
        let weak = fast_hasher();
        let stronger = Argon2Hasher::with_params(2048, 2, 1).unwrap();

        let hash = weak.hash("Sup3rSecret!").unwrap();
        assert!(stronger.verify("Sup3rSecret!", &hash));
    }

    #[test]
    fn test_invalid_params() {
        let result = Argon2Hasher::with_params(1, 0, 0);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
