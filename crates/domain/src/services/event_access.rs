//! Per-event client access.
//!
//! A host proves knowledge of the event password once and receives a signed
//! token scoped to that single event.

use std::sync::Arc;

use serde::Serialize;
use shared::access_token::EventAccessSigner;
use shared::password::verify_password_or_false;
use thiserror::Error;
use uuid::Uuid;

use super::store::{EventStore, StoreError};
use crate::models::Event;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Event not found")]
    EventNotFound,

    /// Covers both a wrong password and an event without a password.
    #[error("Invalid password")]
    InvalidPassword,

    #[error("Invalid or expired access token")]
    InvalidToken,

    #[error("Password verification failed: {0}")]
    Verification(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Token handed to a host after a successful password check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    pub token: String,
    pub event_id: Uuid,
}

pub struct EventAccessService {
    events: Arc<dyn EventStore>,
    signer: EventAccessSigner,
}

impl EventAccessService {
    pub fn new(events: Arc<dyn EventStore>, signer: EventAccessSigner) -> Self {
        Self { events, signer }
    }

    /// Verifies the event password and issues an access token.
    pub async fn request_access(
        &self,
        slug: &str,
        password: &str,
    ) -> Result<AccessGrant, AccessError> {
        let event = self
            .events
            .find_event_by_slug(slug)
            .await?
            .ok_or(AccessError::EventNotFound)?;

        let has_password = event
            .password_hash
            .as_deref()
            .is_some_and(|h| !h.is_empty());
        let stored_hash = event.password_hash.clone();
        let submitted = password.to_string();

        let matched = tokio::task::spawn_blocking(move || {
            verify_password_or_false(&submitted, stored_hash.as_deref())
        })
        .await
        .map_err(|e| AccessError::Verification(e.to_string()))?;

        if !matched {
            if has_password {
                tracing::info!(event_id = %event.id, "Event access denied: wrong password");
            } else {
                tracing::info!(event_id = %event.id, "Event access denied: no password configured");
            }
            return Err(AccessError::InvalidPassword);
        }

        tracing::info!(event_id = %event.id, "Event access granted");

        Ok(AccessGrant {
            token: self.signer.issue(event.id),
            event_id: event.id,
        })
    }

    /// Resolves the event by slug and checks the token was issued for it.
    pub async fn authorize(&self, slug: &str, token: &str) -> Result<Event, AccessError> {
        let event = self
            .events
            .find_event_by_slug(slug)
            .await?
            .ok_or(AccessError::EventNotFound)?;

        let claims = self.signer.verify(token).map_err(|e| {
            tracing::debug!(event_id = %event.id, error = %e, "Event access token rejected");
            AccessError::InvalidToken
        })?;

        if claims.event_id != event.id {
            tracing::warn!(
                event_id = %event.id,
                token_event_id = %claims.event_id,
                "Event access token used for another event"
            );
            return Err(AccessError::InvalidToken);
        }

        Ok(event)
    }
}
