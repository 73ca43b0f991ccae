//! Payment domain models and the payment status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Email stored on a payment until the provider reports the payer's address.
pub const PLACEHOLDER_EMAIL: &str = "pending@checkout.invalid";

/// Purchasable plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentPlan {
    Standard,
    Premium,
}

impl PaymentPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPlan::Standard => "standard",
            PaymentPlan::Premium => "premium",
        }
    }

    /// Checkout item title shown by the provider.
    pub fn title(&self) -> &'static str {
        match self {
            PaymentPlan::Standard => "Reserva la Fecha - Plan Estándar",
            PaymentPlan::Premium => "Reserva la Fecha - Plan Premium",
        }
    }
}

impl FromStr for PaymentPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(PaymentPlan::Standard),
            "premium" => Ok(PaymentPlan::Premium),
            _ => Err(format!("Invalid plan: {}", s)),
        }
    }
}

impl fmt::Display for PaymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Server-side price list. Amounts are whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPricing {
    pub standard: i64,
    pub premium: i64,
}

impl PlanPricing {
    pub fn price_for(&self, plan: PaymentPlan) -> i64 {
        match plan {
            PaymentPlan::Standard => self.standard,
            PaymentPlan::Premium => self.premium,
        }
    }
}

impl Default for PlanPricing {
    fn default() -> Self {
        Self {
            standard: 4999,
            premium: 9999,
        }
    }
}

/// Lifecycle status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Repeating the current status is allowed so provider retries are no-ops.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, Approved)
                | (Approved, Refunded)
                | (Rejected, Rejected)
                | (Refunded, Refunded)
        )
    }

    /// Maps a provider status string onto the local status set.
    ///
    /// Unknown strings map to `Pending`.
    pub fn from_provider_status(status: &str) -> Self {
        match status {
            "approved" => PaymentStatus::Approved,
            "pending" | "in_process" | "authorized" => PaymentStatus::Pending,
            "rejected" | "cancelled" => PaymentStatus::Rejected,
            "refunded" | "charged_back" => PaymentStatus::Refunded,
            _ => PaymentStatus::Pending,
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "approved" => Ok(PaymentStatus::Approved),
            "rejected" => Ok(PaymentStatus::Rejected),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A checkout payment.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub plan: PaymentPlan,
    pub status: PaymentStatus,
    pub amount: i64,
    pub provider_payment_id: Option<String>,
    pub preference_id: Option<String>,
    pub event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// A payment linked to an event can never provision another one.
    pub fn is_used(&self) -> bool {
        self.event_id.is_some()
    }
}

/// Values for inserting a payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub email: String,
    pub phone: Option<String>,
    pub plan: PaymentPlan,
    pub amount: i64,
}

/// Status change reported by the provider, applied conditionally on the
/// status it was computed from.
#[derive(Debug, Clone)]
pub struct PaymentUpdate {
    pub expected_status: PaymentStatus,
    pub status: PaymentStatus,
    pub provider_payment_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Checkout request body. There is deliberately no amount field.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    pub plan: String,

    #[validate(email(message = "Invalid email address"))]
    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    pub email: Option<String>,

    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub phone: Option<String>,
}

/// Result of starting a checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub preference_id: String,
    pub redirect_url: String,
    pub payment_id: Uuid,
}

/// Public summary of a payment, as returned by the verify endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub id: Uuid,
    pub plan: PaymentPlan,
    pub status: PaymentStatus,
    pub email: String,
    pub phone: Option<String>,
    pub amount: i64,
    pub has_event: bool,
}

impl From<&Payment> for PaymentSummary {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            plan: payment.plan,
            status: payment.status,
            email: payment.email.clone(),
            phone: payment.phone.clone(),
            amount: payment.amount,
            has_event: payment.is_used(),
        }
    }
}

/// Webhook body sent by the payment provider.
///
/// Only `type` and `data.id` are read; any status in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderNotification {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub action: Option<String>,
    pub data: Option<ProviderNotificationData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderNotificationData {
    /// Sent as either a string or a number.
    pub id: serde_json::Value,
}

impl ProviderNotification {
    pub fn is_payment(&self) -> bool {
        self.kind.as_deref() == Some("payment")
    }

    /// Provider payment id referenced by the notification, if any.
    pub fn payment_reference(&self) -> Option<String> {
        match &self.data.as_ref()?.id {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
