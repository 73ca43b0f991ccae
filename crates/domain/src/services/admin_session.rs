//! Platform admin session management.
//!
//! The admin password identifies the platform admin; the session secret signs
//! session tokens. The two are configured independently.

use chrono::{DateTime, TimeZone, Utc};
use shared::crypto::secrets_match;
use shared::jwt::{JwtError, SessionClaims, SessionTokenConfig};
use thiserror::Error;

/// Clock skew tolerated when validating session tokens.
const SESSION_LEEWAY_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Server misconfiguration: {0}")]
    Misconfigured(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired session")]
    InvalidSession,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),
}

/// A freshly issued admin session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub max_age_secs: i64,
}

/// Issues and verifies platform admin sessions.
pub struct AdminSessionManager {
    admin_password: String,
    session_secret: String,
    tokens: Option<SessionTokenConfig>,
}

impl std::fmt::Debug for AdminSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSessionManager")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl AdminSessionManager {
    /// Builds the manager. Empty secrets are accepted here and surface as
    /// `Misconfigured` on first use.
    pub fn new(admin_password: &str, session_secret: &str, ttl_secs: i64) -> Self {
        let tokens = SessionTokenConfig::new(session_secret, ttl_secs, SESSION_LEEWAY_SECS).ok();
        Self {
            admin_password: admin_password.to_string(),
            session_secret: session_secret.to_string(),
            tokens,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.admin_password.is_empty() && self.tokens.is_some()
    }

    fn tokens(&self) -> Result<&SessionTokenConfig, SessionError> {
        if self.admin_password.is_empty() {
            return Err(SessionError::Misconfigured(
                "admin password is not configured".to_string(),
            ));
        }
        self.tokens.as_ref().ok_or_else(|| {
            SessionError::Misconfigured("session secret is not configured".to_string())
        })
    }

    /// Checks the submitted password and issues a session token.
    pub fn login(&self, password: &str) -> Result<IssuedSession, SessionError> {
        let tokens = self.tokens()?;

        if !secrets_match(
            self.session_secret.as_bytes(),
            password,
            &self.admin_password,
        ) {
            tracing::info!("Admin login rejected");
            return Err(SessionError::InvalidCredentials);
        }

        let (token, claims) = tokens.issue_admin_token()?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(SessionError::InvalidSession)?;

        tracing::info!(jti = %claims.jti, "Admin session issued");

        Ok(IssuedSession {
            token,
            expires_at,
            max_age_secs: tokens.expiry_secs,
        })
    }

    /// Validates a session token; an absent token is treated as invalid.
    pub fn verify(&self, token: Option<&str>) -> Result<SessionClaims, SessionError> {
        let tokens = self.tokens()?;
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::InvalidSession)?;

        tokens.validate_admin_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Admin session rejected");
            SessionError::InvalidSession
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shared::jwt::DEFAULT_SESSION_EXPIRY_SECS;

    fn manager() -> AdminSessionManager {
        AdminSessionManager::new(
            "admin-password",
            "session-secret-value",
            DEFAULT_SESSION_EXPIRY_SECS,
        )
    }

    #[test]
    fn test_login_and_verify() {
        let m = manager();
        let session = m.login("admin-password").unwrap();
        assert_eq!(session.max_age_secs, 604_800);
        assert!(session.expires_at > Utc::now() + Duration::days(6));

        let claims = m.verify(Some(&session.token)).unwrap();
        assert_eq!(claims.sub, shared::jwt::ADMIN_SUBJECT);
    }

    #[test]
    fn test_wrong_password() {
        assert!(matches!(
            manager().login("admin-passwordx"),
            Err(SessionError::InvalidCredentials)
        ));
        assert!(matches!(
            manager().login(""),
            Err(SessionError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_session_secret_is_not_the_password() {
        assert!(matches!(
            manager().login("session-secret-value"),
            Err(SessionError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_missing_or_garbage_token() {
        let m = manager();
        assert!(matches!(m.verify(None), Err(SessionError::InvalidSession)));
        assert!(matches!(m.verify(Some("")), Err(SessionError::InvalidSession)));
        assert!(matches!(
            m.verify(Some("a.b.c")),
            Err(SessionError::InvalidSession)
        ));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = AdminSessionManager::new("admin-password", "another-secret", 3600);
        let session = other.login("admin-password").unwrap();
        assert!(matches!(
            manager().verify(Some(&session.token)),
            Err(SessionError::InvalidSession)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = SessionTokenConfig::new("session-secret-value", 3600, 0).unwrap();
        let (token, _) = tokens
            .issue_admin_token_at(Utc::now() - Duration::hours(2))
            .unwrap();
        assert!(matches!(
            manager().verify(Some(&token)),
            Err(SessionError::InvalidSession)
        ));
    }

    #[test]
    fn test_misconfiguration_is_distinct() {
        let no_secret = AdminSessionManager::new("admin-password", "", 3600);
        assert!(!no_secret.is_configured());
        assert!(matches!(
            no_secret.login("admin-password"),
            Err(SessionError::Misconfigured(_))
        ));
        assert!(matches!(
            no_secret.verify(Some("x")),
            Err(SessionError::Misconfigured(_))
        ));

        let no_password = AdminSessionManager::new("", "session-secret-value", 3600);
        assert!(matches!(
            no_password.login(""),
            Err(SessionError::Misconfigured(_))
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", manager());
        assert!(!debug.contains("admin-password"));
        assert!(!debug.contains("session-secret-value"));
    }
}
