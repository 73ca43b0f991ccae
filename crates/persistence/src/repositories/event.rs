//! Event repository for database operations.

use domain::models::{Event, EventChanges, EventConfig, NewEvent};
use domain::services::{EventStore, StoreError};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{EventConfigEntity, EventEntity, EventTypeDb};
use crate::metrics::{record_pool_metrics, timed};

const EVENT_COLUMNS: &str = "id, name, slug, event_type, date, location, description, \
     password_hash, is_active, created_at, updated_at";

/// Repository for event and event configuration rows.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Inserts an event and its configuration on an open connection.
///
/// Shared with the payment repository so provisioning can run inside its
/// own transaction.
pub(crate) async fn insert_event(
    conn: &mut PgConnection,
    event: &NewEvent,
) -> Result<EventEntity, sqlx::Error> {
    let entity = sqlx::query_as::<_, EventEntity>(&format!(
        r#"
        INSERT INTO events (name, slug, event_type, date, location, description, password_hash)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}
        "#,
        EVENT_COLUMNS
    ))
    .bind(&event.name)
    .bind(&event.slug)
    .bind(EventTypeDb::from(event.event_type))
    .bind(event.date)
    .bind(&event.location)
    .bind(&event.description)
    .bind(&event.password_hash)
    .fetch_one(&mut *conn)
    .await?;

    let config = EventConfig::from_input(entity.id, &event.config);
    sqlx::query(
        r#"
        INSERT INTO event_configs
            (event_id, requires_menu, requires_dietary, requires_allergies,
             max_adults, max_children, custom_fields)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(config.event_id)
    .bind(config.requires_menu)
    .bind(config.requires_dietary)
    .bind(config.requires_allergies)
    .bind(config.max_adults)
    .bind(config.max_children)
    .bind(config.custom_fields)
    .execute(&mut *conn)
    .await?;

    Ok(entity)
}

#[async_trait::async_trait]
impl EventStore for EventRepository {
    async fn ping(&self) -> Result<(), StoreError> {
        record_pool_metrics(&self.pool);
        timed("ping", async {
            sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
        })
        .await
    }

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let entity = timed(
            "find_event_by_id",
            sqlx::query_as::<_, EventEntity>(&format!(
                "SELECT {} FROM events WHERE id = $1",
                EVENT_COLUMNS
            ))
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError> {
        let entity = timed(
            "find_event_by_slug",
            sqlx::query_as::<_, EventEntity>(&format!(
                "SELECT {} FROM events WHERE slug = $1",
                EVENT_COLUMNS
            ))
            .bind(slug)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn find_event_config(&self, event_id: Uuid) -> Result<Option<EventConfig>, StoreError> {
        let entity = timed(
            "find_event_config",
            sqlx::query_as::<_, EventConfigEntity>(
                r#"
                SELECT event_id, requires_menu, requires_dietary, requires_allergies,
                       max_adults, max_children, custom_fields
                FROM event_configs
                WHERE event_id = $1
                "#,
            )
            .bind(event_id)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let entities = timed(
            "list_events",
            sqlx::query_as::<_, EventEntity>(&format!(
                "SELECT {} FROM events ORDER BY created_at DESC",
                EVENT_COLUMNS
            ))
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event, StoreError> {
        let entity = timed("create_event", async {
            let mut tx = self.pool.begin().await?;
            let entity = insert_event(&mut *tx, &event).await?;
            tx.commit().await?;
            Ok::<_, sqlx::Error>(entity)
        })
        .await?;
        Ok(entity.into())
    }

    async fn update_event(
        &self,
        id: Uuid,
        changes: EventChanges,
    ) -> Result<Option<Event>, StoreError> {
        let entity = timed("update_event", async {
            let mut tx = self.pool.begin().await?;

            let entity = sqlx::query_as::<_, EventEntity>(&format!(
                r#"
                UPDATE events SET
                    name = COALESCE($2, name),
                    slug = COALESCE($3, slug),
                    event_type = COALESCE($4, event_type),
                    date = COALESCE($5, date),
                    location = COALESCE($6, location),
                    description = COALESCE($7, description),
                    password_hash = COALESCE($8, password_hash),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING {}
                "#,
                EVENT_COLUMNS
            ))
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.slug)
            .bind(changes.event_type.map(EventTypeDb::from))
            .bind(changes.date)
            .bind(&changes.location)
            .bind(&changes.description)
            .bind(&changes.password_hash)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(entity) = entity else {
                tx.rollback().await?;
                return Ok(None);
            };

            if let Some(config) = &changes.config {
                sqlx::query(
                    r#"
                    INSERT INTO event_configs
                        (event_id, requires_menu, requires_dietary, requires_allergies,
                         max_adults, max_children, custom_fields)
                    VALUES ($1, COALESCE($2, false), COALESCE($3, false), COALESCE($4, false),
                            COALESCE($5, 10), COALESCE($6, 10), $7)
                    ON CONFLICT (event_id) DO UPDATE SET
                        requires_menu = COALESCE($2, event_configs.requires_menu),
                        requires_dietary = COALESCE($3, event_configs.requires_dietary),
                        requires_allergies = COALESCE($4, event_configs.requires_allergies),
                        max_adults = COALESCE($5, event_configs.max_adults),
                        max_children = COALESCE($6, event_configs.max_children),
                        custom_fields = COALESCE($7, event_configs.custom_fields),
                        updated_at = NOW()
                    "#,
                )
                .bind(id)
                .bind(config.requires_menu)
                .bind(config.requires_dietary)
                .bind(config.requires_allergies)
                .bind(config.max_adults)
                .bind(config.max_children)
                .bind(&config.custom_fields)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;
            Ok::<_, sqlx::Error>(Some(entity))
        })
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn set_event_active(&self, id: Uuid, active: bool) -> Result<Option<Event>, StoreError> {
        let entity = timed(
            "set_event_active",
            sqlx::query_as::<_, EventEntity>(&format!(
                "UPDATE events SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
                EVENT_COLUMNS
            ))
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, StoreError> {
        // rsvps and event_configs go with it (ON DELETE CASCADE)
        let result = timed(
            "delete_event",
            sqlx::query("DELETE FROM events WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
