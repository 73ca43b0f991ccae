//! Signed per-event access tokens.
//!
//! A token is `base64url("<event_id>:<issued_at_millis>") "." hex(hmac)`.
//! The HMAC is keyed with the session secret under a fixed domain prefix so
//! an event token can never be confused with any other signed value.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, TimeZone, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::crypto::{hmac_sha256_hex, verify_hmac_sha256};

/// Default validity of an event access token (30 days).
pub const DEFAULT_EVENT_TOKEN_TTL_SECS: i64 = 2_592_000;

/// Tolerated clock skew for tokens issued "in the future".
const MAX_FUTURE_SKEW_SECS: i64 = 300;

const DOMAIN_PREFIX: &[u8] = b"event-access-v1:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessTokenError {
    #[error("Malformed access token")]
    Malformed,

    #[error("Invalid access token signature")]
    BadSignature,

    #[error("Access token has expired")]
    Expired,

    #[error("Access token issued in the future")]
    NotYetValid,
}

/// Decoded, verified token contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventAccessClaims {
    pub event_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

/// Issues and verifies event access tokens.
#[derive(Clone)]
pub struct EventAccessSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for EventAccessSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventAccessSigner")
            .field("ttl_secs", &self.ttl.num_seconds())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl EventAccessSigner {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn issue(&self, event_id: Uuid) -> String {
        self.issue_at(event_id, Utc::now())
    }

    pub fn issue_at(&self, event_id: Uuid, issued_at: DateTime<Utc>) -> String {
        let payload = format!("{}:{}", event_id, issued_at.timestamp_millis());
        let encoded = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        let signature = hmac_sha256_hex(&self.secret, &self.signing_input(&encoded));
        format!("{}.{}", encoded, signature)
    }

    pub fn verify(&self, token: &str) -> Result<EventAccessClaims, AccessTokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<EventAccessClaims, AccessTokenError> {
        let (encoded, signature) = token.split_once('.').ok_or(AccessTokenError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| AccessTokenError::Malformed)?;

        if !verify_hmac_sha256(&self.secret, &self.signing_input(encoded), &signature) {
            return Err(AccessTokenError::BadSignature);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| AccessTokenError::Malformed)?;
        let payload = String::from_utf8(payload).map_err(|_| AccessTokenError::Malformed)?;
        let (event_id, issued_millis) = payload
            .split_once(':')
            .ok_or(AccessTokenError::Malformed)?;

        let event_id = Uuid::parse_str(event_id).map_err(|_| AccessTokenError::Malformed)?;
        let issued_millis: i64 = issued_millis
            .parse()
            .map_err(|_| AccessTokenError::Malformed)?;
        let issued_at = Utc
            .timestamp_millis_opt(issued_millis)
            .single()
            .ok_or(AccessTokenError::Malformed)?;

        if issued_at > now + Duration::seconds(MAX_FUTURE_SKEW_SECS) {
            return Err(AccessTokenError::NotYetValid);
        }
        if now - issued_at > self.ttl {
            return Err(AccessTokenError::Expired);
        }

        Ok(EventAccessClaims {
            event_id,
            issued_at,
        })
    }

    fn signing_input(&self, encoded: &str) -> Vec<u8> {
        let mut input = DOMAIN_PREFIX.to_vec();
        input.extend_from_slice(encoded.as_bytes());
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> EventAccessSigner {
        EventAccessSigner::new("event-token-secret", DEFAULT_EVENT_TOKEN_TTL_SECS)
    }

    #[test]
    fn test_issue_and_verify() {
        let event_id = Uuid::new_v4();
        let token = signer().issue(event_id);
        let claims = signer().verify(&token).unwrap();
        assert_eq!(claims.event_id, event_id);
    }

    #[test]
    fn test_tokens_for_same_event_are_distinct_over_time() {
        let event_id = Uuid::new_v4();
        let now = Utc::now();
        let a = signer().issue_at(event_id, now);
        let b = signer().issue_at(event_id, now + Duration::milliseconds(5));
        assert_ne!(a, b);
        assert!(signer().verify(&a).is_ok());
        assert!(signer().verify(&b).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = signer().issue(Uuid::new_v4());
        let other = EventAccessSigner::new("different", DEFAULT_EVENT_TOKEN_TTL_SECS);
        assert_eq!(other.verify(&token), Err(AccessTokenError::BadSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = signer().issue(Uuid::new_v4());
        let (_, signature) = token.split_once('.').unwrap();
        let forged_payload =
            URL_SAFE_NO_PAD.encode(format!("{}:{}", Uuid::new_v4(), Utc::now().timestamp_millis()));
        let forged = format!("{}.{}", forged_payload, signature);
        assert_eq!(signer().verify(&forged), Err(AccessTokenError::BadSignature));
    }

    #[test]
    fn test_unsigned_legacy_format_rejected() {
        // bare base64("<id>:<millis>") without a signature
        let legacy = URL_SAFE_NO_PAD.encode(format!("{}:{}", Uuid::new_v4(), 1_700_000_000_000i64));
        assert_eq!(signer().verify(&legacy), Err(AccessTokenError::Malformed));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = Utc::now() - Duration::days(31);
        let token = signer().issue_at(Uuid::new_v4(), issued);
        assert_eq!(signer().verify(&token), Err(AccessTokenError::Expired));
    }

    #[test]
    fn test_token_inside_window_accepted() {
        let issued = Utc::now() - Duration::days(29);
        let token = signer().issue_at(Uuid::new_v4(), issued);
        assert!(signer().verify(&token).is_ok());
    }

    #[test]
    fn test_future_token_rejected() {
        let issued = Utc::now() + Duration::hours(1);
        let token = signer().issue_at(Uuid::new_v4(), issued);
        assert_eq!(signer().verify(&token), Err(AccessTokenError::NotYetValid));
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(signer().verify(""), Err(AccessTokenError::Malformed));
        assert_eq!(signer().verify("abc.zz"), Err(AccessTokenError::Malformed));
        assert_eq!(signer().verify("abc.00ff"), Err(AccessTokenError::BadSignature));
    }
}
