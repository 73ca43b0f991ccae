//! Guest attendance confirmations.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::store::{EventStore, RsvpStore, StoreError};
use crate::models::{Attendance, CreateRsvpRequest, EventConfig, EventType, Rsvp};

#[derive(Debug, Error)]
pub enum RsvpError {
    /// Unknown or inactive event.
    #[error("Event not found")]
    EventNotFound,

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    GuestLimit(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct RsvpService {
    events: Arc<dyn EventStore>,
    rsvps: Arc<dyn RsvpStore>,
}

impl RsvpService {
    pub fn new(events: Arc<dyn EventStore>, rsvps: Arc<dyn RsvpStore>) -> Self {
        Self { events, rsvps }
    }

    /// Records a guest's answer for an active event.
    pub async fn submit(&self, request: CreateRsvpRequest) -> Result<Rsvp, RsvpError> {
        request.validate()?;

        let event = self
            .events
            .find_event_by_id(request.event_id)
            .await?
            .filter(|e| e.is_active)
            .ok_or(RsvpError::EventNotFound)?;
        let config = self.events.find_event_config(event.id).await?;

        check_guest_limits(&request, event.event_type, config.as_ref())?;

        let rsvp = self.rsvps.create_rsvp(&request).await?;
        tracing::info!(
            event_id = %event.id,
            rsvp_id = %rsvp.id,
            attendance = %rsvp.attendance,
            "RSVP recorded"
        );
        Ok(rsvp)
    }

    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<Rsvp>, RsvpError> {
        Ok(self.rsvps.list_rsvps_for_event(event_id).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<Rsvp>, RsvpError> {
        Ok(self.rsvps.list_all_rsvps().await?)
    }
}

fn check_guest_limits(
    request: &CreateRsvpRequest,
    event_type: EventType,
    config: Option<&EventConfig>,
) -> Result<(), RsvpError> {
    // declining guests bring nobody
    if request.attendance == Attendance::No {
        return Ok(());
    }

    if request.children() > 0 && !event_type.allows_children() {
        return Err(RsvpError::GuestLimit(
            "This event does not admit children".to_string(),
        ));
    }

    if let Some(config) = config {
        if request.over_ten > config.max_adults {
            return Err(RsvpError::GuestLimit(format!(
                "At most {} adults per invitation",
                config.max_adults
            )));
        }
        if request.children() > config.max_children {
            return Err(RsvpError::GuestLimit(format!(
                "At most {} children per invitation",
                config.max_children
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventConfigInput, NewEvent};
    use crate::services::memory::InMemoryStore;
    use chrono::Utc;

    async fn setup(event_type: EventType) -> (RsvpService, Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let event = store
            .create_event(NewEvent {
                name: "Evento".to_string(),
                slug: "evento-rsvp".to_string(),
                event_type,
                date: Utc::now(),
                location: None,
                description: None,
                password_hash: None,
                config: EventConfigInput {
                    max_adults: Some(3),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
        (RsvpService::new(store.clone(), store.clone()), store, event.id)
    }

    fn request(event_id: Uuid, over_ten: i32, under_five: i32) -> CreateRsvpRequest {
        serde_json::from_value(serde_json::json!({
            "event_id": event_id,
            "first_name": "Luis",
            "last_name": "Gómez",
            "attendance": "yes",
            "over_ten": over_ten,
            "under_five": under_five
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_and_list() {
        let (service, _, event_id) = setup(EventType::Wedding).await;
        let rsvp = service.submit(request(event_id, 2, 1)).await.unwrap();
        assert_eq!(rsvp.event_id, event_id);

        let listed = service.list_for_event(event_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_event() {
        let (service, _, _) = setup(EventType::Wedding).await;
        assert!(matches!(
            service.submit(request(Uuid::new_v4(), 1, 0)).await,
            Err(RsvpError::EventNotFound)
        ));
    }

    #[tokio::test]
    async fn test_inactive_event() {
        let (service, store, event_id) = setup(EventType::Wedding).await;
        store.set_event_active(event_id, false).await.unwrap();
        assert!(matches!(
            service.submit(request(event_id, 1, 0)).await,
            Err(RsvpError::EventNotFound)
        ));
    }

    #[tokio::test]
    async fn test_adult_limit() {
        let (service, _, event_id) = setup(EventType::Wedding).await;
        assert!(matches!(
            service.submit(request(event_id, 4, 0)).await,
            Err(RsvpError::GuestLimit(_))
        ));
    }

    #[tokio::test]
    async fn test_children_not_admitted_at_corporate_events() {
        let (service, _, event_id) = setup(EventType::Corporate).await;
        assert!(matches!(
            service.submit(request(event_id, 1, 1)).await,
            Err(RsvpError::GuestLimit(_))
        ));
        assert!(service.submit(request(event_id, 1, 0)).await.is_ok());
    }
}
