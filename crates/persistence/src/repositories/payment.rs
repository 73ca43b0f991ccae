//! Payment repository for database operations.

use domain::models::{Event, NewEvent, NewPayment, Payment, PaymentPlan, PaymentUpdate};
use domain::services::{PaymentStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use super::event::insert_event;
use crate::entities::{PaymentEntity, PaymentPlanDb, PaymentStatusDb};
use crate::metrics::timed;

const PAYMENT_COLUMNS: &str = "id, email, phone, plan, status, amount, provider_payment_id, \
     preference_id, event_id, created_at, updated_at";

/// Repository for payment rows.
#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PaymentStore for PaymentRepository {
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, StoreError> {
        let entity = timed(
            "create_payment",
            sqlx::query_as::<_, PaymentEntity>(&format!(
                r#"
                INSERT INTO payments (email, phone, plan, amount)
                VALUES ($1, $2, $3, $4)
                RETURNING {}
                "#,
                PAYMENT_COLUMNS
            ))
            .bind(&payment.email)
            .bind(&payment.phone)
            .bind(PaymentPlanDb::from(payment.plan))
            .bind(payment.amount)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(entity.into())
    }

    async fn find_payment(&self, id: Uuid) -> Result<Option<Payment>, StoreError> {
        let entity = timed(
            "find_payment",
            sqlx::query_as::<_, PaymentEntity>(&format!(
                "SELECT {} FROM payments WHERE id = $1",
                PAYMENT_COLUMNS
            ))
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn set_preference_id(&self, id: Uuid, preference_id: &str) -> Result<(), StoreError> {
        timed(
            "set_preference_id",
            sqlx::query("UPDATE payments SET preference_id = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(preference_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn apply_provider_update(
        &self,
        id: Uuid,
        update: PaymentUpdate,
    ) -> Result<Option<Payment>, StoreError> {
        // status guard turns concurrent webhook deliveries into a no-op for the loser
        let entity = timed(
            "apply_provider_update",
            sqlx::query_as::<_, PaymentEntity>(&format!(
                r#"
                UPDATE payments SET
                    status = $3,
                    provider_payment_id = $4,
                    email = COALESCE($5, email),
                    phone = COALESCE($6, phone),
                    updated_at = NOW()
                WHERE id = $1 AND status = $2
                RETURNING {}
                "#,
                PAYMENT_COLUMNS
            ))
            .bind(id)
            .bind(PaymentStatusDb::from(update.expected_status))
            .bind(PaymentStatusDb::from(update.status))
            .bind(&update.provider_payment_id)
            .bind(&update.email)
            .bind(&update.phone)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn list_unused_approved(&self, plan: PaymentPlan) -> Result<Vec<Payment>, StoreError> {
        let entities = timed(
            "list_unused_approved",
            sqlx::query_as::<_, PaymentEntity>(&format!(
                r#"
                SELECT {}
                FROM payments
                WHERE plan = $1 AND status = 'approved' AND event_id IS NULL
                ORDER BY created_at DESC
                "#,
                PAYMENT_COLUMNS
            ))
            .bind(PaymentPlanDb::from(plan))
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn create_event_for_payment(
        &self,
        payment_id: Uuid,
        plan: PaymentPlan,
        event: NewEvent,
    ) -> Result<Option<Event>, StoreError> {
        let entity = timed("create_event_for_payment", async {
            let mut tx = self.pool.begin().await?;
            let entity = insert_event(&mut *tx, &event).await?;

            // a concurrent claimer blocks on the row lock, then sees event_id set
            let linked = sqlx::query(
                r#"
                UPDATE payments
                SET event_id = $1, updated_at = NOW()
                WHERE id = $2 AND event_id IS NULL AND status = 'approved' AND plan = $3
                "#,
            )
            .bind(entity.id)
            .bind(payment_id)
            .bind(PaymentPlanDb::from(plan))
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if linked == 0 {
                tx.rollback().await?;
                tracing::warn!(payment_id = %payment_id, "Payment no longer claimable; event rolled back");
                return Ok(None);
            }

            tx.commit().await?;
            Ok::<_, sqlx::Error>(Some(entity))
        })
        .await?;
        Ok(entity.map(Into::into))
    }
}
