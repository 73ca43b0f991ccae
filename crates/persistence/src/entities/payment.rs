//! Payment entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Payment, PaymentPlan, PaymentStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for payment_plan that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_plan", rename_all = "lowercase")]
pub enum PaymentPlanDb {
    Standard,
    Premium,
}

impl From<PaymentPlanDb> for PaymentPlan {
    fn from(db: PaymentPlanDb) -> Self {
        match db {
            PaymentPlanDb::Standard => PaymentPlan::Standard,
            PaymentPlanDb::Premium => PaymentPlan::Premium,
        }
    }
}

impl From<PaymentPlan> for PaymentPlanDb {
    fn from(plan: PaymentPlan) -> Self {
        match plan {
            PaymentPlan::Standard => PaymentPlanDb::Standard,
            PaymentPlan::Premium => PaymentPlanDb::Premium,
        }
    }
}

/// Database enum for payment_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
pub enum PaymentStatusDb {
    Pending,
    Approved,
    Rejected,
    Refunded,
}

impl From<PaymentStatusDb> for PaymentStatus {
    fn from(db: PaymentStatusDb) -> Self {
        match db {
            PaymentStatusDb::Pending => PaymentStatus::Pending,
            PaymentStatusDb::Approved => PaymentStatus::Approved,
            PaymentStatusDb::Rejected => PaymentStatus::Rejected,
            PaymentStatusDb::Refunded => PaymentStatus::Refunded,
        }
    }
}

impl From<PaymentStatus> for PaymentStatusDb {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => PaymentStatusDb::Pending,
            PaymentStatus::Approved => PaymentStatusDb::Approved,
            PaymentStatus::Rejected => PaymentStatusDb::Rejected,
            PaymentStatus::Refunded => PaymentStatusDb::Refunded,
        }
    }
}

/// Database row mapping for the payments table.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub plan: PaymentPlanDb,
    pub status: PaymentStatusDb,
    pub amount: i64,
    pub provider_payment_id: Option<String>,
    pub preference_id: Option<String>,
    pub event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentEntity> for Payment {
    fn from(entity: PaymentEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            phone: entity.phone,
            plan: entity.plan.into(),
            status: entity.status.into(),
            amount: entity.amount,
            provider_payment_id: entity.provider_payment_id,
            preference_id: entity.preference_id,
            event_id: entity.event_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
