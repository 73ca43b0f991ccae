//! Event domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Default guest limits for a freshly provisioned event.
pub const DEFAULT_MAX_ADULTS: i32 = 10;
pub const DEFAULT_MAX_CHILDREN: i32 = 10;

/// Kind of celebration an event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Wedding,
    Fifteen,
    AdultBirthday,
    ChildrensEvent,
    Babyshower,
    Corporate,
    FamilyCelebration,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::Wedding,
        EventType::Fifteen,
        EventType::AdultBirthday,
        EventType::ChildrensEvent,
        EventType::Babyshower,
        EventType::Corporate,
        EventType::FamilyCelebration,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Wedding => "wedding",
            EventType::Fifteen => "fifteen",
            EventType::AdultBirthday => "adult_birthday",
            EventType::ChildrensEvent => "childrens_event",
            EventType::Babyshower => "babyshower",
            EventType::Corporate => "corporate",
            EventType::FamilyCelebration => "family_celebration",
            EventType::Other => "other",
        }
    }

    /// Whether guests may bring children to this kind of event.
    pub fn allows_children(&self) -> bool {
        !matches!(self, EventType::Babyshower | EventType::Corporate)
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid event type: {}", s))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An invitation event.
///
/// The password hash never leaves the server; it is skipped on serialization
/// so every projection built from this type is safe to return.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-event RSVP form configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    pub event_id: Uuid,
    pub requires_menu: bool,
    pub requires_dietary: bool,
    pub requires_allergies: bool,
    pub max_adults: i32,
    pub max_children: i32,
    pub custom_fields: Option<serde_json::Value>,
}

impl EventConfig {
    /// Builds the stored configuration from optional input, filling defaults.
    pub fn from_input(event_id: Uuid, input: &EventConfigInput) -> Self {
        Self {
            event_id,
            requires_menu: input.requires_menu.unwrap_or(false),
            requires_dietary: input.requires_dietary.unwrap_or(false),
            requires_allergies: input.requires_allergies.unwrap_or(false),
            max_adults: input.max_adults.unwrap_or(DEFAULT_MAX_ADULTS),
            max_children: input.max_children.unwrap_or(DEFAULT_MAX_CHILDREN),
            custom_fields: input.custom_fields.clone(),
        }
    }

    /// Applies a partial update, keeping fields the input leaves out.
    pub fn merge(&mut self, input: &EventConfigInput) {
        if let Some(v) = input.requires_menu {
            self.requires_menu = v;
        }
        if let Some(v) = input.requires_dietary {
            self.requires_dietary = v;
        }
        if let Some(v) = input.requires_allergies {
            self.requires_allergies = v;
        }
        if let Some(v) = input.max_adults {
            self.max_adults = v;
        }
        if let Some(v) = input.max_children {
            self.max_children = v;
        }
        if input.custom_fields.is_some() {
            self.custom_fields = input.custom_fields.clone();
        }
    }
}

/// Optional configuration fields accepted on create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EventConfigInput {
    pub requires_menu: Option<bool>,
    pub requires_dietary: Option<bool>,
    pub requires_allergies: Option<bool>,

    #[validate(range(min = 0, max = 50, message = "max_adults must be between 0 and 50"))]
    pub max_adults: Option<i32>,

    #[validate(range(min = 0, max = 50, message = "max_children must be between 0 and 50"))]
    pub max_children: Option<i32>,

    pub custom_fields: Option<serde_json::Value>,
}

/// Event together with its configuration.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub config: Option<EventConfig>,
}

/// Request payload for creating an event.
///
/// `paymentId` is only honoured on the paid creation paths; the slug is
/// derived from the name when omitted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_slug"))]
    pub slug: Option<String>,

    #[serde(rename = "type")]
    #[validate(custom(function = "validate_event_type"))]
    pub event_type: String,

    pub date: DateTime<Utc>,

    #[validate(length(max = 300, message = "Location must be at most 300 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "shared::validation::validate_event_password"))]
    pub password: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub config: Option<EventConfigInput>,

    #[serde(rename = "paymentId")]
    pub payment_id: Option<Uuid>,
}

/// Request payload for updating an event. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = "shared::validation::validate_slug"))]
    pub slug: Option<String>,

    #[serde(rename = "type")]
    #[validate(custom(function = "validate_event_type"))]
    pub event_type: Option<String>,

    pub date: Option<DateTime<Utc>>,

    #[validate(length(max = 300, message = "Location must be at most 300 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "shared::validation::validate_event_password"))]
    pub password: Option<String>,

    #[validate(nested)]
    pub config: Option<EventConfigInput>,
}

/// Validates the `type` field against the closed set of event types.
pub fn validate_event_type(value: &str) -> Result<(), validator::ValidationError> {
    value.parse::<EventType>().map(|_| ()).map_err(|_| {
        let mut err = validator::ValidationError::new("event_type");
        err.message = Some("Invalid event type".into());
        err
    })
}

/// Fully resolved values for inserting an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub slug: String,
    pub event_type: EventType,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub password_hash: Option<String>,
    pub config: EventConfigInput,
}

/// Resolved changes for updating an event.
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub event_type: Option<EventType>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub password_hash: Option<String>,
    pub config: Option<EventConfigInput>,
}

/// Result of provisioning an event.
///
/// `password` carries the plaintext only when the server generated it; it is
/// never stored or returned again.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedEvent {
    pub event: Event,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "Boda Demo".to_string(),
            slug: "boda-demo".to_string(),
            event_type: EventType::Wedding,
            date: Utc::now(),
            location: None,
            description: None,
            password_hash: Some("$argon2id$v=19$secret".to_string()),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_event_type_round_trip() {
        for t in EventType::ALL {
            assert_eq!(t.as_str().parse::<EventType>().unwrap(), t);
            assert_eq!(
                serde_json::to_string(&t).unwrap(),
                format!("\"{}\"", t.as_str())
            );
        }
        assert!("birthday".parse::<EventType>().is_err());
    }

    #[test]
    fn test_event_type_children() {
        assert!(EventType::Wedding.allows_children());
        assert!(!EventType::Corporate.allows_children());
        assert!(!EventType::Babyshower.allows_children());
    }

    #[test]
    fn test_event_serialization_hides_password_hash() {
        let json = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(json["type"], "wedding");
        assert_eq!(json["is_active"], true);
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_config_defaults_and_merge() {
        let id = Uuid::new_v4();
        let mut config = EventConfig::from_input(id, &EventConfigInput::default());
        assert_eq!(config.max_adults, DEFAULT_MAX_ADULTS);
        assert_eq!(config.max_children, DEFAULT_MAX_CHILDREN);
        assert!(!config.requires_menu);

        config.merge(&EventConfigInput {
            requires_menu: Some(true),
            max_children: Some(0),
            ..Default::default()
        });
        assert!(config.requires_menu);
        assert_eq!(config.max_children, 0);
        assert_eq!(config.max_adults, DEFAULT_MAX_ADULTS);
    }

    #[test]
    fn test_create_request_validation() {
        let valid: CreateEventRequest = serde_json::from_value(serde_json::json!({
            "name": "Boda Demo",
            "slug": "boda-demo",
            "type": "wedding",
            "date": "2026-12-12T20:00:00Z",
            "password": "abc123"
        }))
        .unwrap();
        assert!(valid.validate().is_ok());

        let mut bad_slug = valid.clone();
        bad_slug.slug = Some("Boda Demo".to_string());
        assert!(bad_slug.validate().is_err());

        let mut bad_type = valid.clone();
        bad_type.event_type = "party".to_string();
        assert!(bad_type.validate().is_err());

        let mut short_password = valid.clone();
        short_password.password = Some("abc".to_string());
        assert!(short_password.validate().is_err());

        let mut empty_name = valid;
        empty_name.name = String::new();
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_create_request_reads_payment_id() {
        let id = Uuid::new_v4();
        let request: CreateEventRequest = serde_json::from_value(serde_json::json!({
            "name": "Cumple",
            "type": "fifteen",
            "date": "2026-12-12T20:00:00Z",
            "paymentId": id
        }))
        .unwrap();
        assert_eq!(request.payment_id, Some(id));
        assert!(request.slug.is_none());
    }

    #[test]
    fn test_created_event_omits_absent_password() {
        let created = CreatedEvent {
            event: sample_event(),
            password: None,
        };
        let json = serde_json::to_value(&created).unwrap();
        assert!(json.get("password").is_none());
    }
}
