//! Event entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Event, EventConfig, EventType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for event_type that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
pub enum EventTypeDb {
    Wedding,
    Fifteen,
    AdultBirthday,
    ChildrensEvent,
    Babyshower,
    Corporate,
    FamilyCelebration,
    Other,
}

impl From<EventTypeDb> for EventType {
    fn from(db: EventTypeDb) -> Self {
        match db {
            EventTypeDb::Wedding => EventType::Wedding,
            EventTypeDb::Fifteen => EventType::Fifteen,
            EventTypeDb::AdultBirthday => EventType::AdultBirthday,
            EventTypeDb::ChildrensEvent => EventType::ChildrensEvent,
            EventTypeDb::Babyshower => EventType::Babyshower,
            EventTypeDb::Corporate => EventType::Corporate,
            EventTypeDb::FamilyCelebration => EventType::FamilyCelebration,
            EventTypeDb::Other => EventType::Other,
        }
    }
}

impl From<EventType> for EventTypeDb {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Wedding => EventTypeDb::Wedding,
            EventType::Fifteen => EventTypeDb::Fifteen,
            EventType::AdultBirthday => EventTypeDb::AdultBirthday,
            EventType::ChildrensEvent => EventTypeDb::ChildrensEvent,
            EventType::Babyshower => EventTypeDb::Babyshower,
            EventType::Corporate => EventTypeDb::Corporate,
            EventType::FamilyCelebration => EventTypeDb::FamilyCelebration,
            EventType::Other => EventTypeDb::Other,
        }
    }
}

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub event_type: EventTypeDb,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventEntity> for Event {
    fn from(entity: EventEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            slug: entity.slug,
            event_type: entity.event_type.into(),
            date: entity.date,
            location: entity.location,
            description: entity.description,
            password_hash: entity.password_hash,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the event_configs table.
#[derive(Debug, Clone, FromRow)]
pub struct EventConfigEntity {
    pub event_id: Uuid,
    pub requires_menu: bool,
    pub requires_dietary: bool,
    pub requires_allergies: bool,
    pub max_adults: i32,
    pub max_children: i32,
    pub custom_fields: Option<serde_json::Value>,
}

impl From<EventConfigEntity> for EventConfig {
    fn from(entity: EventConfigEntity) -> Self {
        Self {
            event_id: entity.event_id,
            requires_menu: entity.requires_menu,
            requires_dietary: entity.requires_dietary,
            requires_allergies: entity.requires_allergies,
            max_adults: entity.max_adults,
            max_children: entity.max_children,
            custom_fields: entity.custom_fields,
        }
    }
}
