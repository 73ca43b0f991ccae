//! Persistence gateway traits.
//!
//! Services depend on these traits only; the PostgreSQL repositories and the
//! in-memory store both implement them.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    CreateRsvpRequest, Event, EventChanges, EventConfig, NewEvent, NewPayment, Payment,
    PaymentPlan, PaymentUpdate, Rsvp,
};

/// Errors raised by a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (e.g. slug already taken).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    /// Cheap connectivity check used by readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError>;

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError>;

    async fn find_event_config(&self, event_id: Uuid) -> Result<Option<EventConfig>, StoreError>;

    /// All events, newest first.
    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    /// Inserts an event and its configuration. Slug collisions yield `Conflict`.
    async fn create_event(&self, event: NewEvent) -> Result<Event, StoreError>;

    /// Applies changes and upserts the configuration. `None` if the event is gone.
    async fn update_event(
        &self,
        id: Uuid,
        changes: EventChanges,
    ) -> Result<Option<Event>, StoreError>;

    async fn set_event_active(&self, id: Uuid, active: bool) -> Result<Option<Event>, StoreError>;

    /// Hard-deletes an event with its RSVPs and configuration.
    async fn delete_event(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, StoreError>;

    async fn find_payment(&self, id: Uuid) -> Result<Option<Payment>, StoreError>;

    async fn set_preference_id(&self, id: Uuid, preference_id: &str) -> Result<(), StoreError>;

    /// Applies a provider update only if the stored status still equals
    /// `update.expected_status`. Returns `None` when it did not.
    async fn apply_provider_update(
        &self,
        id: Uuid,
        update: PaymentUpdate,
    ) -> Result<Option<Payment>, StoreError>;

    /// Approved payments of `plan` not yet linked to an event, newest first.
    async fn list_unused_approved(&self, plan: PaymentPlan) -> Result<Vec<Payment>, StoreError>;

    /// Creates the event and links it to the payment as one atomic step.
    ///
    /// The link only succeeds while the payment is approved, of `plan`, and
    /// unused. When it does not, nothing is written and `Ok(None)` is returned.
    async fn create_event_for_payment(
        &self,
        payment_id: Uuid,
        plan: PaymentPlan,
        event: NewEvent,
    ) -> Result<Option<Event>, StoreError>;
}

#[async_trait::async_trait]
pub trait RsvpStore: Send + Sync {
    async fn create_rsvp(&self, rsvp: &CreateRsvpRequest) -> Result<Rsvp, StoreError>;

    /// RSVPs of one event, newest first.
    async fn list_rsvps_for_event(&self, event_id: Uuid) -> Result<Vec<Rsvp>, StoreError>;

    async fn list_all_rsvps(&self) -> Result<Vec<Rsvp>, StoreError>;
}
