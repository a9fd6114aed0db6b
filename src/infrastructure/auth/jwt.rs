//! JWT token issuance and verification

use std::fmt::Debug;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, TokenError};

/// Minimum signing secret length in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (username)
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    /// Create claims for a subject, expiring `ttl` from now
    pub fn new(subject: &str, ttl: Duration) -> Result<Self, DomainError> {
        let iat = Utc::now().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| DomainError::invalid_input("Token ttl is too large"))?;
        let exp = iat
            .checked_add(ttl_secs)
            .ok_or_else(|| DomainError::invalid_input("Token ttl is too large"))?;

        Ok(Self {
            sub: subject.to_string(),
            iat,
            exp,
        })
    }

    /// A token is valid strictly before its expiry second
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Configuration for the JWT service
///
/// Built once at startup from an external secret source.
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    token_ttl: Duration,
}

impl JwtConfig {
    /// Create a new JWT configuration, rejecting secrets shorter than 32 bytes
    pub fn new(secret: impl Into<String>, token_ttl: Duration) -> Result<Self, DomainError> {
        let secret = secret.into();

        if secret.len() < MIN_SECRET_LENGTH {
            return Err(DomainError::configuration(format!(
                "JWT secret must be at least {} bytes, got {}",
                MIN_SECRET_LENGTH,
                secret.len()
            )));
        }

        Ok(Self { secret, token_ttl })
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[hidden]")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Trait for token operations
pub trait TokenService: Send + Sync + Debug {
    /// Sign a token for `subject` that expires after `ttl`
    fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, DomainError>;

    /// Check signature and expiry, returning the claims
    fn verify(&self, token: &str) -> Result<JwtClaims, TokenError>;

    /// Lifetime used for login tokens
    fn default_ttl(&self) -> Duration;
}

/// HS256 JWT service
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // Expiry is checked against the claims without leeway
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }
}

impl TokenService for JwtService {
    fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, DomainError> {
        if subject.is_empty() {
            return Err(DomainError::invalid_input("Token subject cannot be empty"));
        }

        let claims = JwtClaims::new(subject, ttl)?;

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    fn verify(&self, token: &str) -> Result<JwtClaims, TokenError> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| map_jwt_error(e.kind()))?;

        if token_data.claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }

    fn default_ttl(&self) -> Duration {
        self.config.token_ttl
    }
}

fn map_jwt_error(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-with-at-least-32-bytes";

    fn create_service() -> JwtService {
        JwtService::new(JwtConfig::new(SECRET, Duration::from_secs(24 * 3600)).unwrap())
    }

    fn tamper_signature(token: &str) -> String {
        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        format!("{}.{}", head, chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_issue_and_verify() {
        let service = create_service();

        let issued = service.issue("alice", service.default_ttl()).unwrap();
        assert!(!issued.token.is_empty());

        let claims = service.verify(&issued.token).unwrap();
        assert_eq!(claims.subject(), "alice");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.expires_at(), issued.expires_at);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let service = create_service();

        let issued = service.issue("alice", Duration::ZERO).unwrap();
        assert_eq!(service.verify(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_signature() {
        let service = create_service();

        let issued = service.issue("alice", service.default_ttl()).unwrap();
        let tampered = tamper_signature(&issued.token);

        assert_eq!(service.verify(&tampered), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_payload() {
        let service = create_service();
        let issued = service.issue("alice", service.default_ttl()).unwrap();
        let other = service.issue("mallory", service.default_ttl()).unwrap();

        // Splice mallory's claims under alice's signature
        let parts: Vec<&str> = issued.token.split('.').collect();
        let other_parts: Vec<&str> = other.token.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(service.verify(&spliced), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = create_service();
        let service2 = JwtService::new(
            JwtConfig::new("another-secret-key-with-32-bytes-min", Duration::from_secs(60))
                .unwrap(),
        );

        let issued = service1.issue("alice", service1.default_ttl()).unwrap();

        // Token signed with a different secret should fail verification
        assert_eq!(service2.verify(&issued.token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_malformed_tokens() {
        let service = create_service();

        assert_eq!(service.verify("invalid-token"), Err(TokenError::Malformed));
        assert_eq!(service.verify(""), Err(TokenError::Malformed));
        assert_eq!(service.verify("a.b.c"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_expired_token() {
        let service = create_service();

        // Create claims with expiration 1 hour in the past
        let past_time = Utc::now() - chrono::Duration::hours(1);
        let claims = JwtClaims {
            sub: "alice".to_string(),
            iat: (past_time - chrono::Duration::hours(2)).timestamp(),
            exp: past_time.timestamp(),
        };

        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let service = create_service();
        let claims = JwtClaims::new("alice", Duration::from_secs(60)).unwrap();

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_missing_subject_is_malformed() {
        let service = create_service();
        let now = Utc::now().timestamp();

        let token = encode(
            &Header::new(ALGORITHM),
            &serde_json::json!({"iat": now, "exp": now + 60}),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let service = create_service();

        let result = service.issue("", Duration::from_secs(60));
        assert!(matches!(result, Err(DomainError::InvalidInput { .. })));
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = JwtConfig::new("too-short", Duration::from_secs(60));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));

        assert!(JwtConfig::new("x".repeat(MIN_SECRET_LENGTH), Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn test_debug_hides_secret() {
        let service = create_service();
        let debug = format!("{:?}", service);

        assert!(!debug.contains(SECRET));
        assert!(debug.contains("[hidden]"));
    }

    #[test]
    fn test_concurrent_verification() {
        let service = create_service();
        let issued = service.issue("alice", service.default_ttl()).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        let claims = service.verify(&issued.token).unwrap();
                        assert_eq!(claims.subject(), "alice");
                    }
                });
            }
        });
    }
}
