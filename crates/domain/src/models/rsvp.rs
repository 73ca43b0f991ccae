//! RSVP domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Guest's answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    #[serde(alias = "si")]
    Yes,
    No,
    #[serde(alias = "quizas")]
    Maybe,
}

impl Attendance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attendance::Yes => "yes",
            Attendance::No => "no",
            Attendance::Maybe => "maybe",
        }
    }
}

impl std::fmt::Display for Attendance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored attendance confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct Rsvp {
    pub id: Uuid,
    pub event_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub attendance: Attendance,
    pub under_five: i32,
    pub five_to_ten: i32,
    pub over_ten: i32,
    pub dietary_restrictions: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for submitting an RSVP.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRsvpRequest {
    pub event_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"))]
    pub last_name: String,

    pub attendance: Attendance,

    #[serde(default)]
    #[validate(range(min = 0, max = 50, message = "Guest counts must be between 0 and 50"))]
    pub under_five: i32,

    #[serde(default)]
    #[validate(range(min = 0, max = 50, message = "Guest counts must be between 0 and 50"))]
    pub five_to_ten: i32,

    #[serde(default)]
    #[validate(range(min = 0, max = 50, message = "Guest counts must be between 0 and 50"))]
    pub over_ten: i32,

    #[validate(length(max = 500, message = "Dietary restrictions must be at most 500 characters"))]
    pub dietary_restrictions: Option<String>,

    #[validate(length(max = 1000, message = "Message must be at most 1000 characters"))]
    pub message: Option<String>,
}

impl CreateRsvpRequest {
    pub fn children(&self) -> i32 {
        self.under_five + self.five_to_ten
    }
}
