//! RSVP entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Attendance, Rsvp};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for attendance that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "attendance", rename_all = "lowercase")]
pub enum AttendanceDb {
    Yes,
    No,
    Maybe,
}

impl From<AttendanceDb> for Attendance {
    fn from(db: AttendanceDb) -> Self {
        match db {
            AttendanceDb::Yes => Attendance::Yes,
            AttendanceDb::No => Attendance::No,
            AttendanceDb::Maybe => Attendance::Maybe,
        }
    }
}

impl From<Attendance> for AttendanceDb {
    fn from(attendance: Attendance) -> Self {
        match attendance {
            Attendance::Yes => AttendanceDb::Yes,
            Attendance::No => AttendanceDb::No,
            Attendance::Maybe => AttendanceDb::Maybe,
        }
    }
}

/// Database row mapping for the rsvps table.
#[derive(Debug, Clone, FromRow)]
pub struct RsvpEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub attendance: AttendanceDb,
    pub under_five: i32,
    pub five_to_ten: i32,
    pub over_ten: i32,
    pub dietary_restrictions: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RsvpEntity> for Rsvp {
    fn from(entity: RsvpEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            first_name: entity.first_name,
            last_name: entity.last_name,
            attendance: entity.attendance.into(),
            under_five: entity.under_five,
            five_to_ten: entity.five_to_ten,
            over_ten: entity.over_ten,
            dietary_restrictions: entity.dietary_restrictions,
            message: entity.message,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_conversions_are_inverse() {
        for a in [Attendance::Yes, Attendance::No, Attendance::Maybe] {
            assert_eq!(Attendance::from(AttendanceDb::from(a)), a);
        }
    }
}
