//! Event provisioning gate.
//!
//! Every event is created here. Paid paths carry a [`PaymentClaim`] and must
//! present an approved, unused payment of the reserved plan; the admin path
//! creates events without one.

use std::sync::Arc;

use shared::crypto::generate_event_password;
use shared::password::hash_password;
use shared::validation::{slugify, validate_slug};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::store::{EventStore, PaymentStore, StoreError};
use crate::models::{
    CreateEventRequest, CreatedEvent, EventType, NewEvent, PaymentPlan, PaymentStatus,
};

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidField(String),

    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Payment has not been approved yet")]
    PaymentNotApproved,

    #[error("This payment is for a different plan")]
    WrongPlan,

    #[error("This payment has already been used to create an event")]
    PaymentAlreadyUsed,

    #[error("Slug '{0}' is already taken")]
    SlugTaken(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(StoreError),
}

/// A payment presented to unlock a creation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentClaim {
    pub payment_id: Uuid,
    /// Plan the creation path is reserved for.
    pub reserved_plan: PaymentPlan,
}

pub struct ProvisioningService {
    events: Arc<dyn EventStore>,
    payments: Arc<dyn PaymentStore>,
}

impl ProvisioningService {
    pub fn new(events: Arc<dyn EventStore>, payments: Arc<dyn PaymentStore>) -> Self {
        Self { events, payments }
    }

    /// Validates the draft, checks the claim if any, and creates the event.
    ///
    /// With a claim, the event insert and the payment link happen atomically;
    /// losing that race reports `PaymentAlreadyUsed` and leaves no event.
    pub async fn create_event(
        &self,
        request: CreateEventRequest,
        claim: Option<PaymentClaim>,
    ) -> Result<CreatedEvent, ProvisioningError> {
        request.validate()?;

        let event_type: EventType = request
            .event_type
            .parse()
            .map_err(ProvisioningError::InvalidField)?;
        let slug = match request.slug.as_deref() {
            Some(slug) => slug.to_string(),
            None => slugify(&request.name),
        };
        validate_slug(&slug).map_err(|e| {
            ProvisioningError::InvalidField(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid slug".to_string()),
            )
        })?;

        if let Some(claim) = &claim {
            self.check_claim(claim).await?;
        }

        let (password, generated) = match request.password {
            Some(password) => (password, false),
            None => (generate_event_password(), true),
        };
        let password_hash = hash_in_background(password.clone())
            .await
            .map_err(ProvisioningError::Hashing)?;

        let new_event = NewEvent {
            name: request.name.trim().to_string(),
            slug: slug.clone(),
            event_type,
            date: request.date,
            location: request.location,
            description: request.description,
            password_hash: Some(password_hash),
            config: request.config.unwrap_or_default(),
        };

        let event = match claim {
            Some(claim) => self
                .payments
                .create_event_for_payment(claim.payment_id, claim.reserved_plan, new_event)
                .await
                .map_err(|e| map_store_error(e, &slug))?
                .ok_or_else(|| {
                    tracing::warn!(payment_id = %claim.payment_id, "Payment claimed concurrently");
                    ProvisioningError::PaymentAlreadyUsed
                })?,
            None => self
                .events
                .create_event(new_event)
                .await
                .map_err(|e| map_store_error(e, &slug))?,
        };

        tracing::info!(
            event_id = %event.id,
            slug = %event.slug,
            payment_id = ?claim.map(|c| c.payment_id),
            generated_password = generated,
            "Event provisioned"
        );

        Ok(CreatedEvent {
            event,
            password: generated.then_some(password),
        })
    }

    async fn check_claim(&self, claim: &PaymentClaim) -> Result<(), ProvisioningError> {
        let payment = self
            .payments
            .find_payment(claim.payment_id)
            .await
            .map_err(ProvisioningError::Store)?
            .ok_or(ProvisioningError::PaymentNotFound)?;

        if payment.status != PaymentStatus::Approved {
            return Err(ProvisioningError::PaymentNotApproved);
        }
        if payment.plan != claim.reserved_plan {
            return Err(ProvisioningError::WrongPlan);
        }
        if payment.is_used() {
            return Err(ProvisioningError::PaymentAlreadyUsed);
        }
        Ok(())
    }
}

/// Hashes a password on the blocking pool.
pub(crate) async fn hash_in_background(password: String) -> Result<String, String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

fn map_store_error(err: StoreError, slug: &str) -> ProvisioningError {
    match err {
        StoreError::Conflict(_) => ProvisioningError::SlugTaken(slug.to_string()),
        other => ProvisioningError::Store(other),
    }
}
