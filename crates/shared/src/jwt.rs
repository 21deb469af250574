//! JWT token utilities using the HS256 algorithm.
//!
//! Tokens are stateless: every claim needed to authorize a request
//! (user id, username, role, email) travels inside the token and is
//! re-validated on each request. There is no server-side revocation list.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    /// Role name as stored on the user (`admin` or `staff`)
    pub role: String,
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID (unique token identifier)
    pub jti: String,
}

/// Identity embedded into a freshly issued token.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: i64,
    pub username: &'a str,
    pub role: &'a str,
    pub email: &'a str,
}

/// A signed token together with its identifier.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_in: i64,
}

/// Configuration for JWT token generation and validation.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    /// Token expiration in seconds (default: 86400 = 24 hours)
    pub token_expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance (default: 30)
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("token_expiry_secs", &self.token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Default token lifetime (24 hours)
pub const DEFAULT_TOKEN_EXPIRY_SECS: i64 = 86_400;

/// Shortest secret accepted for HMAC signing.
pub const MIN_SECRET_LEN: usize = 32;

impl JwtConfig {
    /// Creates a new JwtConfig from a shared HMAC secret.
    pub fn new(secret: &str, token_expiry_secs: i64) -> Result<Self, JwtError> {
        Self::with_leeway(secret, token_expiry_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a new JwtConfig with a custom clock-skew leeway.
    ///
    /// # Arguments
    /// * `secret` - HMAC secret, at least [`MIN_SECRET_LEN`] bytes
    /// * `token_expiry_secs` - Token lifetime in seconds
    /// * `leeway_secs` - Leeway in seconds for clock skew tolerance
    pub fn with_leeway(
        secret: &str,
        token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::InvalidKey(format!(
                "secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            token_expiry_secs,
            leeway_secs,
        })
    }

    /// Issues a token for the given identity.
    ///
    /// # Arguments
    /// * `subject` - User id, username, role and email to embed
    ///
    /// # Returns
    /// * `Ok(IssuedToken)` - Signed token, its `jti` and expiry
    /// * `Err(JwtError::EncodingError)` - If signing fails
    pub fn generate_token(&self, subject: TokenSubject<'_>) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();
        let exp = (now + Duration::seconds(self.token_expiry_secs)).timestamp();

        let claims = Claims {
            sub: subject.user_id.to_string(),
            username: subject.username.to_string(),
            role: subject.role.to_string(),
            email: subject.email.to_string(),
            exp,
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_in: self.token_expiry_secs,
        })
    }

    /// Validates a token's signature and expiry and returns its claims.
    ///
    /// Expiry is checked with the configured leeway.
    ///
    /// # Returns
    /// * `Ok(Claims)` - For a token signed with this secret and not yet expired
    /// * `Err(JwtError::TokenExpired)` - Past `exp` plus leeway
    /// * `Err(JwtError::InvalidToken)` - Malformed token or bad signature
    /// * `Err(JwtError::DecodingError)` - Any other decoding failure
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Extracts user ID from validated claims.
pub fn extract_user_id(claims: &Claims) -> Result<i64, JwtError> {
    claims.sub.parse::<i64>().map_err(|_| JwtError::InvalidToken)
}
