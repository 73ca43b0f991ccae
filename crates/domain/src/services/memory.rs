//! In-memory persistence gateway.
//!
//! Backs tests and local development without a database. All state sits
//! behind a single mutex, so every trait method observes and mutates a
//! consistent snapshot.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use super::store::{EventStore, PaymentStore, RsvpStore, StoreError};
use crate::models::{
    CreateRsvpRequest, Event, EventChanges, EventConfig, NewEvent, NewPayment, Payment,
    PaymentPlan, PaymentStatus, PaymentUpdate, Rsvp,
};

#[derive(Debug, Default)]
struct State {
    events: HashMap<Uuid, Event>,
    configs: HashMap<Uuid, EventConfig>,
    payments: HashMap<Uuid, Payment>,
    rsvps: Vec<Rsvp>,
}

impl State {
    fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.events
            .values()
            .any(|e| e.slug == slug && Some(e.id) != except)
    }

    fn insert_event(&mut self, new: NewEvent) -> Result<Event, StoreError> {
        if self.slug_taken(&new.slug, None) {
            return Err(StoreError::Conflict(format!(
                "slug '{}' is already in use",
                new.slug
            )));
        }

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: new.name,
            slug: new.slug,
            event_type: new.event_type,
            date: new.date,
            location: new.location,
            description: new.description,
            password_hash: new.password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.configs
            .insert(event.id, EventConfig::from_input(event.id, &new.config));
        self.events.insert(event.id, event.clone());
        Ok(event)
    }
}

/// Gateway keeping all records in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Backend(format!("state lock poisoned: {}", e)))
    }

    /// Overwrites a payment's status directly, bypassing the state machine.
    pub fn force_payment_status(&self, id: Uuid, status: PaymentStatus) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if let Some(payment) = state.payments.get_mut(&id) {
            payment.status = status;
            payment.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.lock()?.events.get(&id).cloned())
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError> {
        Ok(self
            .lock()?
            .events
            .values()
            .find(|e| e.slug == slug)
            .cloned())
    }

    async fn find_event_config(&self, event_id: Uuid) -> Result<Option<EventConfig>, StoreError> {
        Ok(self.lock()?.configs.get(&event_id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let mut events: Vec<Event> = self.lock()?.events.values().cloned().collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event, StoreError> {
        self.lock()?.insert_event(event)
    }

    async fn update_event(
        &self,
        id: Uuid,
        changes: EventChanges,
    ) -> Result<Option<Event>, StoreError> {
        let mut state = self.lock()?;

        if let Some(slug) = &changes.slug {
            if state.slug_taken(slug, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "slug '{}' is already in use",
                    slug
                )));
            }
        }

        let Some(event) = state.events.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            event.name = name;
        }
        if let Some(slug) = changes.slug {
            event.slug = slug;
        }
        if let Some(event_type) = changes.event_type {
            event.event_type = event_type;
        }
        if let Some(date) = changes.date {
            event.date = date;
        }
        if changes.location.is_some() {
            event.location = changes.location;
        }
        if changes.description.is_some() {
            event.description = changes.description;
        }
        if changes.password_hash.is_some() {
            event.password_hash = changes.password_hash;
        }
        event.updated_at = Utc::now();
        let updated = event.clone();

        if let Some(input) = changes.config {
            state
                .configs
                .entry(id)
                .and_modify(|c| c.merge(&input))
                .or_insert_with(|| EventConfig::from_input(id, &input));
        }

        Ok(Some(updated))
    }

    async fn set_event_active(&self, id: Uuid, active: bool) -> Result<Option<Event>, StoreError> {
        let mut state = self.lock()?;
        Ok(state.events.get_mut(&id).map(|event| {
            event.is_active = active;
            event.updated_at = Utc::now();
            event.clone()
        }))
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        if state.events.remove(&id).is_none() {
            return Ok(false);
        }
        state.configs.remove(&id);
        state.rsvps.retain(|r| r.event_id != id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl PaymentStore for InMemoryStore {
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, StoreError> {
        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            email: payment.email,
            phone: payment.phone,
            plan: payment.plan,
            status: PaymentStatus::Pending,
            amount: payment.amount,
            provider_payment_id: None,
            preference_id: None,
            event_id: None,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn find_payment(&self, id: Uuid) -> Result<Option<Payment>, StoreError> {
        Ok(self.lock()?.payments.get(&id).cloned())
    }

    async fn set_preference_id(&self, id: Uuid, preference_id: &str) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if let Some(payment) = state.payments.get_mut(&id) {
            payment.preference_id = Some(preference_id.to_string());
            payment.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn apply_provider_update(
        &self,
        id: Uuid,
        update: PaymentUpdate,
    ) -> Result<Option<Payment>, StoreError> {
        let mut state = self.lock()?;
        let Some(payment) = state.payments.get_mut(&id) else {
            return Ok(None);
        };
        if payment.status != update.expected_status {
            return Ok(None);
        }

        payment.status = update.status;
        payment.provider_payment_id = Some(update.provider_payment_id);
        if let Some(email) = update.email {
            payment.email = email;
        }
        if update.phone.is_some() {
            payment.phone = update.phone;
        }
        payment.updated_at = Utc::now();
        Ok(Some(payment.clone()))
    }

    async fn list_unused_approved(&self, plan: PaymentPlan) -> Result<Vec<Payment>, StoreError> {
        let mut payments: Vec<Payment> = self
            .lock()?
            .payments
            .values()
            .filter(|p| p.plan == plan && p.status == PaymentStatus::Approved && !p.is_used())
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    async fn create_event_for_payment(
        &self,
        payment_id: Uuid,
        plan: PaymentPlan,
        event: NewEvent,
    ) -> Result<Option<Event>, StoreError> {
        let mut state = self.lock()?;

        let claimable = state.payments.get(&payment_id).is_some_and(|p| {
            p.status == PaymentStatus::Approved && p.plan == plan && !p.is_used()
        });
        if !claimable {
            return Ok(None);
        }

        let event = state.insert_event(event)?;
        if let Some(payment) = state.payments.get_mut(&payment_id) {
            payment.event_id = Some(event.id);
            payment.updated_at = Utc::now();
        }
        Ok(Some(event))
    }
}

#[async_trait::async_trait]
impl RsvpStore for InMemoryStore {
    async fn create_rsvp(&self, rsvp: &CreateRsvpRequest) -> Result<Rsvp, StoreError> {
        let mut state = self.lock()?;
        if !state.events.contains_key(&rsvp.event_id) {
            return Err(StoreError::Conflict(format!(
                "event {} does not exist",
                rsvp.event_id
            )));
        }

        let rsvp = Rsvp {
            id: Uuid::new_v4(),
            event_id: rsvp.event_id,
            first_name: rsvp.first_name.clone(),
            last_name: rsvp.last_name.clone(),
            attendance: rsvp.attendance,
            under_five: rsvp.under_five,
            five_to_ten: rsvp.five_to_ten,
            over_ten: rsvp.over_ten,
            dietary_restrictions: rsvp.dietary_restrictions.clone(),
            message: rsvp.message.clone(),
            created_at: Utc::now(),
        };
        state.rsvps.push(rsvp.clone());
        Ok(rsvp)
    }

    async fn list_rsvps_for_event(&self, event_id: Uuid) -> Result<Vec<Rsvp>, StoreError> {
        let mut rsvps: Vec<Rsvp> = self
            .lock()?
            .rsvps
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        rsvps.reverse();
        Ok(rsvps)
    }

    async fn list_all_rsvps(&self) -> Result<Vec<Rsvp>, StoreError> {
        let mut rsvps = self.lock()?.rsvps.clone();
        rsvps.reverse();
        Ok(rsvps)
    }
}
