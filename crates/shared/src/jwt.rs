//! Admin session JWT utilities.
//!
//! Platform admin sessions are stateless HS256 tokens signed with a dedicated
//! session secret. The secret is never the admin password itself.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Subject claim carried by every admin session token.
pub const ADMIN_SUBJECT: &str = "platform-admin";

/// Default admin session lifetime (7 days).
pub const DEFAULT_SESSION_EXPIRY_SECS: i64 = 604_800;

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

/// Role asserted by a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    Admin,
}

/// Admin session claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: SessionRole,
    pub exp: i64,
    pub iat: i64,
    /// Unique token id, useful for log correlation.
    pub jti: String,
}

/// Signing configuration for admin session tokens.
#[derive(Clone)]
pub struct SessionTokenConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    pub expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for SessionTokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenConfig")
            .field("expiry_secs", &self.expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl SessionTokenConfig {
    /// Creates a config from a shared HMAC secret.
    ///
    /// An empty secret is rejected; callers map that to a misconfiguration.
    pub fn new(secret: &str, expiry_secs: i64, leeway_secs: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidKey("session secret is empty".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
            leeway_secs,
        })
    }

    /// Issues an admin session token valid from now.
    pub fn issue_admin_token(&self) -> Result<(String, SessionClaims), JwtError> {
        self.issue_admin_token_at(Utc::now())
    }

    /// Issues an admin session token as if issued at `issued_at`.
    pub fn issue_admin_token_at(
        &self,
        issued_at: DateTime<Utc>,
    ) -> Result<(String, SessionClaims), JwtError> {
        let claims = SessionClaims {
            sub: ADMIN_SUBJECT.to_string(),
            role: SessionRole::Admin,
            exp: (issued_at + Duration::seconds(self.expiry_secs)).timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, claims))
    }

    /// Validates signature, expiry, and the admin role claim.
    pub fn validate_admin_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                    _ => JwtError::DecodingError(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if claims.sub != ADMIN_SUBJECT || claims.role != SessionRole::Admin {
            return Err(JwtError::InvalidToken);
        }

        Ok(claims)
    }
}
