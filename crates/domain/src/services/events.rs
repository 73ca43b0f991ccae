//! Event management after provisioning.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::provisioning::hash_in_background;
use super::store::{EventStore, StoreError};
use crate::models::{Event, EventChanges, EventDetails, EventType, UpdateEventRequest};

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidField(String),

    #[error("Slug '{0}' is already taken")]
    SlugTaken(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EventError {
    fn from(err: StoreError) -> Self {
        EventError::Store(err)
    }
}

pub struct EventService {
    events: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    pub async fn list(&self) -> Result<Vec<Event>, EventError> {
        Ok(self.events.list_events().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Event, EventError> {
        self.events
            .find_event_by_id(id)
            .await?
            .ok_or(EventError::NotFound)
    }

    /// Event plus configuration, by id.
    pub async fn details(&self, id: Uuid) -> Result<EventDetails, EventError> {
        let event = self.get(id).await?;
        self.with_config(event).await
    }

    /// Public page data. Inactive events are hidden.
    pub async fn public_by_slug(&self, slug: &str) -> Result<EventDetails, EventError> {
        let event = self
            .events
            .find_event_by_slug(slug)
            .await?
            .filter(|e| e.is_active)
            .ok_or(EventError::NotFound)?;
        self.with_config(event).await
    }

    pub async fn with_config(&self, event: Event) -> Result<EventDetails, EventError> {
        let config = self.events.find_event_config(event.id).await?;
        Ok(EventDetails { event, config })
    }

    /// Applies an update; a new password is hashed before storage.
    pub async fn update(&self, id: Uuid, request: UpdateEventRequest) -> Result<Event, EventError> {
        request.validate()?;

        let event_type = request
            .event_type
            .as_deref()
            .map(str::parse::<EventType>)
            .transpose()
            .map_err(EventError::InvalidField)?;

        let password_hash = match request.password {
            Some(password) => Some(
                hash_in_background(password)
                    .await
                    .map_err(EventError::Hashing)?,
            ),
            None => None,
        };

        let changes = EventChanges {
            name: request.name.map(|n| n.trim().to_string()),
            slug: request.slug.clone(),
            event_type,
            date: request.date,
            location: request.location,
            description: request.description,
            password_hash,
            config: request.config,
        };

        let updated = self
            .events
            .update_event(id, changes)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    EventError::SlugTaken(request.slug.clone().unwrap_or_default())
                }
                other => EventError::Store(other),
            })?
            .ok_or(EventError::NotFound)?;

        tracing::info!(event_id = %id, "Event updated");
        Ok(updated)
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<Event, EventError> {
        let event = self
            .events
            .set_event_active(id, active)
            .await?
            .ok_or(EventError::NotFound)?;
        tracing::info!(event_id = %id, is_active = active, "Event activation changed");
        Ok(event)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), EventError> {
        if !self.events.delete_event(id).await? {
            return Err(EventError::NotFound);
        }
        tracing::info!(event_id = %id, "Event deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventConfigInput, NewEvent};
    use crate::services::memory::InMemoryStore;
    use chrono::Utc;
    use shared::password::verify_password;

    async fn setup() -> (EventService, Event) {
        let store = Arc::new(InMemoryStore::new());
        let event = store
            .create_event(NewEvent {
                name: "Quince de Sofi".to_string(),
                slug: "quince-sofi".to_string(),
                event_type: EventType::Fifteen,
                date: Utc::now(),
                location: None,
                description: None,
                password_hash: None,
                config: EventConfigInput::default(),
            })
            .await
            .unwrap();
        store
            .create_event(NewEvent {
                name: "Otro".to_string(),
                slug: "otro-evento".to_string(),
                event_type: EventType::Other,
                date: Utc::now(),
                location: None,
                description: None,
                password_hash: None,
                config: EventConfigInput::default(),
            })
            .await
            .unwrap();
        (EventService::new(store), event)
    }

    #[tokio::test]
    async fn test_update_fields_and_config() {
        let (service, event) = setup().await;
        let updated = service
            .update(
                event.id,
                UpdateEventRequest {
                    location: Some("Salón Dorado".to_string()),
                    config: Some(EventConfigInput {
                        requires_menu: Some(true),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.location.as_deref(), Some("Salón Dorado"));
        assert_eq!(updated.name, "Quince de Sofi");

        let details = service.details(event.id).await.unwrap();
        assert!(details.config.unwrap().requires_menu);
    }

    #[tokio::test]
    async fn test_update_rehashes_password() {
        let (service, event) = setup().await;
        let updated = service
            .update(
                event.id,
                UpdateEventRequest {
                    password: Some("nueva-clave".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let hash = updated.password_hash.unwrap();
        assert!(verify_password("nueva-clave", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_update_slug_conflict() {
        let (service, event) = setup().await;
        let result = service
            .update(
                event.id,
                UpdateEventRequest {
                    slug: Some("otro-evento".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(EventError::SlugTaken(_))));
    }

    #[tokio::test]
    async fn test_update_invalid_type() {
        let (service, event) = setup().await;
        let result = service
            .update(
                event.id,
                UpdateEventRequest {
                    event_type: Some("rave".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(EventError::Validation(_))));
    }

    #[tokio::test]
    async fn test_inactive_event_hidden_from_public() {
        let (service, event) = setup().await;
        assert!(service.public_by_slug("quince-sofi").await.is_ok());
        service.set_active(event.id, false).await.unwrap();
        assert!(matches!(
            service.public_by_slug("quince-sofi").await,
            Err(EventError::NotFound)
        ));
        assert!(service.details(event.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete() {
        let (service, event) = setup().await;
        service.delete(event.id).await.unwrap();
        assert!(matches!(service.get(event.id).await, Err(EventError::NotFound)));
        assert!(matches!(service.delete(event.id).await, Err(EventError::NotFound)));
    }
}
