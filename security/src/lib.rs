// security/src/lib.rs
use std::sync::LazyLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use models::{Role, StaffError, StaffRecord};

/// Login failure message. Identical for unknown emails and wrong passwords.
pub const INVALID_CREDENTIALS: &str = "Invalid work email or password";

/// Session validity window.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Custom authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{}", INVALID_CREDENTIALS)]
    InvalidCredentials,
    #[error("Password hashing error: {0}")]
    PasswordHashError(String),
    #[error("JWT error: {0}")]
    JwtError(String),
}

impl From<AuthError> for StaffError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => StaffError::auth(INVALID_CREDENTIALS),
            other => StaffError::Internal(other.to_string()),
        }
    }
}

/// Hashes a password using Argon2id with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHashError(format!("Failed to hash password with Argon2: {}", e)))
}

/// Verifies a password against a PHC-format Argon2 hash.
///
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AuthError> {
    let password_hash = PasswordHash::new(hashed_password)
        .map_err(|e| AuthError::PasswordHashError(format!("Failed to parse Argon2 password hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &password_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswordHashError(format!("Failed to verify Argon2 password: {}", e))),
    }
}

static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("medistaff-timing-equalizer").ok());

/// Verifies against `hashed_password`, or against a throwaway hash when the
/// account does not exist, so both failure paths cost the same. Always
/// `Ok(false)` in the latter case.
pub fn verify_password_or_dummy(password: &str, hashed_password: Option<&str>) -> Result<bool, AuthError> {
    match hashed_password {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            Ok(false)
        }
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Internal record id.
    pub sub: Uuid,
    pub staff_id: String,
    pub role: Role,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
}

/// HS256 signing keys plus the session lifetime.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        SessionKeys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a session token for `record`.
    pub fn issue(&self, record: &StaffRecord) -> Result<IssuedSession, AuthError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: record.id,
            staff_id: record.staff_id.clone(),
            role: record.role,
            email: record.work_email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::JwtError(format!("Failed to encode JWT: {}", e)))?;
        Ok(IssuedSession { token, claims })
    }

    /// Decodes and validates a session token (signature and expiry).
    pub fn validate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AuthError::JwtError(format!("Failed to decode or validate JWT: {}", e)))
    }
}
