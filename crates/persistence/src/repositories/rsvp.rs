//! RSVP repository for database operations.

use domain::models::{CreateRsvpRequest, Rsvp};
use domain::services::{RsvpStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AttendanceDb, RsvpEntity};
use crate::metrics::timed;

const RSVP_COLUMNS: &str = "id, event_id, first_name, last_name, attendance, under_five, \
     five_to_ten, over_ten, dietary_restrictions, message, created_at";

/// Repository for RSVP rows.
#[derive(Clone)]
pub struct RsvpRepository {
    pool: PgPool,
}

impl RsvpRepository {
    /// Creates a new RsvpRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RsvpStore for RsvpRepository {
    async fn create_rsvp(&self, rsvp: &CreateRsvpRequest) -> Result<Rsvp, StoreError> {
        let entity = timed(
            "create_rsvp",
            sqlx::query_as::<_, RsvpEntity>(&format!(
                r#"
                INSERT INTO rsvps
                    (event_id, first_name, last_name, attendance, under_five, five_to_ten,
                     over_ten, dietary_restrictions, message)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING {}
                "#,
                RSVP_COLUMNS
            ))
            .bind(rsvp.event_id)
            .bind(rsvp.first_name.trim())
            .bind(rsvp.last_name.trim())
            .bind(AttendanceDb::from(rsvp.attendance))
            .bind(rsvp.under_five)
            .bind(rsvp.five_to_ten)
            .bind(rsvp.over_ten)
            .bind(&rsvp.dietary_restrictions)
            .bind(&rsvp.message)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(entity.into())
    }

    async fn list_rsvps_for_event(&self, event_id: Uuid) -> Result<Vec<Rsvp>, StoreError> {
        let entities = timed(
            "list_rsvps_for_event",
            sqlx::query_as::<_, RsvpEntity>(&format!(
                "SELECT {} FROM rsvps WHERE event_id = $1 ORDER BY created_at DESC",
                RSVP_COLUMNS
            ))
            .bind(event_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn list_all_rsvps(&self) -> Result<Vec<Rsvp>, StoreError> {
        let entities = timed(
            "list_all_rsvps",
            sqlx::query_as::<_, RsvpEntity>(&format!(
                "SELECT {} FROM rsvps ORDER BY created_at DESC",
                RSVP_COLUMNS
            ))
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(entities.into_iter().map(Into::into).collect())
    }
}
